use arcadesim::core::handle_session::handle_session;
use arcadesim::interfaces::frontend_interface::SessionSnapshot;
use arcadesim::post::scores::ScoreBoard;
use arcadesim::post::session_result::{EventKind, SessionResult};
use arcadesim::pre::read_sim_pars::{read_sim_pars, read_track_mask};
use arcadesim::pre::sim_opts::SimOpts;
use clap::Parser;
use plotters::prelude::*;
use rayon::prelude::*;
use std::path::Path;
use std::thread;
use std::time::Instant;

fn export_speed_plot(result: &SessionResult) -> anyhow::Result<String> {
    let out_dir = Path::new("output");
    std::fs::create_dir_all(out_dir)?;
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let filename = format!("session_plot_{}.png", ts);
    let out_path = out_dir.join(filename);

    let x_max = result
        .speed_trace
        .last()
        .map(|(t, _)| *t)
        .unwrap_or(1.0)
        .max(1.0);
    let mut y_max = result
        .speed_trace
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);
    if !y_max.is_finite() || y_max <= 0.0 {
        y_max = 1.0;
    }
    y_max *= 1.05;

    let root = BitMapBackend::new(out_path.to_str().unwrap(), (1280, 720)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Speed over session time ({})", result.track_name),
            ("sans-serif", 24).into_font(),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Session time in s")
        .y_desc("Speed in units/s")
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 16))
        .draw()?;

    chart
        .draw_series(LineSeries::new(result.speed_trace.iter().copied(), &BLUE))?
        .label("speed")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    // vertical markers for lap completions and crashes
    for ev in &result.events {
        let (color, width) = match ev.kind {
            EventKind::LapCompleted => (BLACK, 1),
            EventKind::Crash => (RED, 2),
        };
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(ev.time_s, 0.0), (ev.time_s, y_max)],
            color.stroke_width(width),
        )))?;
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .label_font(("sans-serif", 16))
        .position(plotters::chart::SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(out_path.to_string_lossy().into_owned())
}

/// select_best_result picks the run to report from a batch: the most completed laps wins,
/// total time breaks ties. Returns `None` for an empty batch.
fn select_best_result(results: Vec<SessionResult>) -> Option<SessionResult> {
    let mut best_result: Option<SessionResult> = None;
    for result in results {
        let better = match &best_result {
            Some(best) => {
                result.lap_times.len() > best.lap_times.len()
                    || (result.lap_times.len() == best.lap_times.len()
                        && result.total_time < best.total_time)
            }
            None => true,
        };
        if better {
            best_result = Some(result);
        }
    }
    best_result
}

/// Console stand-in for a graphical frontend: prints a compact status line per snapshot and
/// the final result once it arrives.
fn run_console_frontend(rx: flume::Receiver<SessionSnapshot>) {
    while let Ok(snapshot) = rx.recv() {
        if let Some(result) = snapshot.final_result {
            result.print_result();
            break;
        }
        println!(
            "INFO: t={:7.2}s | lap {}/{} | lap time {:6.2}s | pos ({:7.1}, {:7.1}) | speed {:6.1}{}{}",
            snapshot.session_time,
            snapshot.current_lap,
            snapshot.total_laps,
            snapshot.lap_timer,
            snapshot.vehicle.position.0,
            snapshot.vehicle.position.1,
            snapshot.vehicle.speed,
            if snapshot.vehicle.drifting { " | DRIFT" } else { "" },
            if snapshot.vehicle.crashed { " | WRECKED" } else { "" },
        );
    }
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    // get simulation parameters
    let sim_pars = if let Some(parfile_path) = &sim_opts.parfile_path {
        println!("INFO: Reading simulation parameters from {:?}", parfile_path);
        read_sim_pars(parfile_path)?
    } else {
        anyhow::bail!("No parameter file provided! Use -p <path_to_json> to run the simulation.");
    };

    if sim_opts.no_sim_runs == 0 {
        anyhow::bail!("Number of simulation runs must be at least 1!");
    }

    let mask = read_track_mask(&sim_pars.track_pars)?;

    // print session details
    println!(
        "INFO: Simulating {} with vehicle {} and a time step size of {:.4}s",
        sim_pars.track_pars.name, sim_pars.run_pars.vehicle, sim_opts.timestep_size
    );

    // EXECUTION -----------------------------------------------------------------------------------
    if !sim_opts.stream {
        println!("INFO: Running {} simulation run(s)...", sim_opts.no_sim_runs);
        let t_start = Instant::now();

        let results: Vec<anyhow::Result<SessionResult>> = (0..sim_opts.no_sim_runs)
            .into_par_iter()
            .map(|_| {
                handle_session(
                    &sim_pars,
                    mask.clone(),
                    sim_opts.timestep_size,
                    sim_opts.debug,
                    None,
                    1.0,
                    sim_opts.no_sim_runs == 1,
                )
            })
            .collect();

        println!("INFO: Execution time: {}ms", t_start.elapsed().as_millis());

        let session_results = results.into_iter().collect::<anyhow::Result<Vec<_>>>()?;
        let result = match select_best_result(session_results) {
            Some(result) => result,
            None => anyhow::bail!("No simulation run produced a result!"),
        };
        result.print_result();

        match export_speed_plot(&result) {
            Ok(path) => println!("INFO: Plot written to {}", path),
            Err(e) => eprintln!("WARNING: Failed to write the plot: {}", e),
        }

        // SCORE KEEPING ---------------------------------------------------------------------------
        let score_path = Path::new("output").join("score.json");
        let mut board = ScoreBoard::load(&score_path);
        if board.update_best(sim_pars.track_pars.map_index, &result) {
            println!(
                "RESULT: New best total time for {}: {:.3}s",
                sim_pars.track_pars.name, result.total_time
            );
            board.save(&score_path)?;
        } else if let Some(best) = board.best_total(sim_pars.track_pars.map_index) {
            println!(
                "RESULT: Best total time for {} remains {:.3}s",
                sim_pars.track_pars.name, best
            );
        }
    } else {
        println!("INFO: Starting streaming simulation...");

        // channel between the simulator thread and the frontend
        let (tx, rx) = flume::unbounded();

        let sim_opts_thread = sim_opts.clone();
        let sim_pars_thread = sim_pars.clone();
        let mask_thread = mask.clone();

        let sim_handle = thread::spawn(move || {
            handle_session(
                &sim_pars_thread,
                mask_thread,
                sim_opts_thread.timestep_size,
                false,
                Some(&tx),
                sim_opts_thread.realtime_factor,
                false,
            )
        });

        // the frontend runs on the main thread
        run_console_frontend(rx);

        match sim_handle.join() {
            Ok(result) => {
                result?;
            }
            Err(_) => anyhow::bail!("Simulation thread panicked!"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(lap_times: Vec<f64>) -> SessionResult {
        SessionResult {
            total_time: lap_times.iter().sum(),
            lap_times,
            ..Default::default()
        }
    }

    #[test]
    fn empty_batch_yields_no_result() {
        assert!(select_best_result(Vec::new()).is_none());
    }

    #[test]
    fn more_completed_laps_beats_a_faster_partial_run() {
        let best = select_best_result(vec![result(vec![20.0]), result(vec![40.0, 41.0])]).unwrap();
        assert_eq!(best.lap_times.len(), 2);
    }

    #[test]
    fn total_time_breaks_ties() {
        let best = select_best_result(vec![
            result(vec![32.0, 33.0]),
            result(vec![30.0, 31.0]),
            result(vec![35.0, 36.0]),
        ])
        .unwrap();
        assert_eq!(best.total_time, 61.0);
    }
}
