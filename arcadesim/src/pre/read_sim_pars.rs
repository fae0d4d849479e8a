use crate::core::script::ScriptEntry;
use crate::core::track_mask::{TrackMask, TrackPars};
use crate::core::vehicle::VehiclePars;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Read;
use std::path::Path;

/// * `vehicle` - Key into `vehicle_pars_all` selecting the driven car
/// * `t_max` - (s) Hard cap on session time, after which the run ends unfinished
/// * `script` - Scripted input timeline driving the car
#[derive(Debug, Deserialize, Clone)]
pub struct RunPars {
    pub vehicle: String,
    pub t_max: f64,
    pub script: Vec<ScriptEntry>,
}

/// SimPars is used to store all other parameter structs.
#[derive(Debug, Deserialize, Clone)]
pub struct SimPars {
    pub track_pars: TrackPars,
    pub vehicle_pars_all: HashMap<String, VehiclePars>,
    pub run_pars: RunPars,
}

impl SimPars {
    /// vehicle_pars resolves the run's vehicle selection against the roster.
    pub fn vehicle_pars(&self) -> anyhow::Result<&VehiclePars> {
        self.vehicle_pars_all.get(&self.run_pars.vehicle).context(format!(
            "Vehicle {} is not part of the vehicle parameters!",
            self.run_pars.vehicle
        ))
    }
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}

/// read_track_mask loads the track's luminance grid from the CSV file referenced by the
/// track parameters (one row per mask row, one byte per cell).
pub fn read_track_mask(track_pars: &TrackPars) -> anyhow::Result<TrackMask> {
    let fh = OpenOptions::new()
        .read(true)
        .open(&track_pars.mask_file)
        .context(format!(
            "Failed to open track mask file {}!",
            track_pars.mask_file
        ))?;
    track_mask_from_reader(fh, track_pars.scale).context(format!(
        "Failed to parse track mask file {}!",
        track_pars.mask_file
    ))
}

/// Grid decoding split off from the file handling so it is testable on in-memory data.
fn track_mask_from_reader<R: Read>(reader: R, scale: f64) -> anyhow::Result<TrackMask> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);

    let mut samples: Vec<u8> = Vec::new();
    let mut width = 0usize;
    let mut height = 0usize;

    for record in csv_reader.records() {
        let record = record.context("Failed to read a track mask row!")?;
        if width == 0 {
            width = record.len();
        } else if record.len() != width {
            anyhow::bail!(
                "Track mask row {} holds {} cells, but the first row holds {}!",
                height,
                record.len(),
                width
            );
        }

        for field in record.iter() {
            let value: u8 = field.trim().parse().context(format!(
                "Track mask cell {:?} is not a byte value!",
                field
            ))?;
            samples.push(value);
        }
        height += 1;
    }

    TrackMask::new(width, height, scale, samples)
}
