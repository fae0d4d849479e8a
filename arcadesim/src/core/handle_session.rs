use crate::core::script::DriveScript;
use crate::core::session::RaceSession;
use crate::core::track_mask::TrackMask;
use crate::interfaces::frontend_interface::{SessionSnapshot, MAX_FRONTEND_UPDATE_FREQUENCY};
use crate::post::session_result::SessionResult;
use crate::pre::read_sim_pars::SimPars;
use anyhow::Context;
use flume::Sender;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// handle_session creates and simulates a race session on the basis of the inserted
/// parameters, and returns the result for post-processing.
pub fn handle_session(
    sim_pars: &SimPars,
    mask: TrackMask,
    timestep_size: f64,
    print_debug: bool,
    tx: Option<&Sender<SessionSnapshot>>,
    realtime_factor: f64,
    print_events: bool,
) -> anyhow::Result<SessionResult> {
    let vehicle_pars = sim_pars.vehicle_pars()?;
    let mut session = RaceSession::new(&sim_pars.track_pars, vehicle_pars, mask, print_events);
    let script = DriveScript::new(sim_pars.run_pars.script.clone());
    let t_max = sim_pars.run_pars.t_max;

    // check if sender was inserted -> in that case use real-time simulation for a frontend
    let sim_realtime = tx.is_some();
    if !sim_realtime {
        let mut t_session_update_print = 0.0;
        while !session.race_finished() && session.session_time() < t_max {
            let intent = script.intent_at(session.session_time());
            session.tick(timestep_size, intent);
            if print_debug && session.session_time() > t_session_update_print + 0.9999 {
                println!(
                    "INFO: Simulating... Current session time is {:.3}s, current lap is {}",
                    session.session_time(),
                    session.current_lap()
                );
                t_session_update_print = session.session_time();
            }
        }
    } else {
        let mut t_session_update_print = 0.0;
        let mut t_session_update_frontend = 0.0;

        while !session.race_finished() && session.session_time() < t_max {
            let t_start = Instant::now();
            let intent = script.intent_at(session.session_time());
            session.tick(timestep_size, intent);
            if session.session_time() > t_session_update_print + 0.9999 {
                println!(
                    "INFO: Simulating... Current session time is {:.3}s, current lap is {}",
                    session.session_time(),
                    session.current_lap()
                );
                t_session_update_print = session.session_time();
            }
            if session.session_time()
                > t_session_update_frontend + 1.0 / MAX_FRONTEND_UPDATE_FREQUENCY - 0.001
            {
                tx.unwrap()
                    .send(session.snapshot(None))
                    .context("Failed to send session state to the frontend!")?;
                t_session_update_frontend = session.session_time();
            }

            // sleep until time step is finished in real-time as well (calculation in ms)
            let t_sleep = (timestep_size * 1000.0 / realtime_factor) as i64
                - t_start.elapsed().as_millis() as i64;

            if t_sleep > 0 {
                sleep(Duration::from_millis(t_sleep as u64));
            } else {
                println!("WARNING: Could not keep up with real-time!")
            }
        }

        // after the real-time loop finishes, send the final result once
        if let Some(tx) = tx {
            let result = session.get_session_result();
            tx.send(session.snapshot(Some(result)))
                .context("Failed to send the final session result to the frontend!")?;
        }
    }

    if print_debug && !session.race_finished() {
        println!(
            "DEBUG: Session time cap of {:.1}s reached after {} completed laps",
            t_max,
            session.lap_times().len()
        )
    }

    Ok(session.get_session_result())
}
