use anyhow::{bail, Result};
use serde::Deserialize;

/// Marking is the semantic classification of a single track-mask pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marking {
    Track,
    StartLine,
    FinishLine,
    OffTrack,
    Unused,
    Checkpoint,
}

/// * `name` - Track name
/// * `map_index` - Index of the track in the map roster (used as the score file key)
/// * `scale` - Render scale of the mask bitmap (world units per mask pixel)
/// * `spawn_point` - (world units) Spawn position of the car
/// * `spawn_direction` - (deg) Heading of the car at spawn
/// * `total_laps` - Number of laps to complete the race
/// * `mask_file` - Path to the CSV luminance grid of the mask
#[derive(Debug, Deserialize, Clone)]
pub struct TrackPars {
    pub name: String,
    pub map_index: usize,
    pub scale: f64,
    pub spawn_point: [f64; 2],
    pub spawn_direction: f64,
    pub total_laps: u32,
    pub mask_file: String,
}

/// TrackMask owns the decoded single-channel raster of the track bitmap and answers
/// point-classification queries in world space. It is immutable after construction.
#[derive(Debug, Clone)]
pub struct TrackMask {
    width: usize,
    height: usize,
    scale: f64,
    samples: Vec<u8>,
}

impl TrackMask {
    pub fn new(width: usize, height: usize, scale: f64, samples: Vec<u8>) -> Result<TrackMask> {
        if width == 0 || height == 0 {
            bail!("Track mask dimensions must be positive, but are {}x{}!", width, height)
        }
        if scale <= 0.0 {
            bail!("Track render scale must be positive, but is {:.3}!", scale)
        }
        if samples.len() != width * height {
            bail!(
                "Track mask sample buffer holds {} bytes, but {}x{} = {} are required!",
                samples.len(),
                width,
                height,
                width * height
            )
        }

        Ok(TrackMask {
            width,
            height,
            scale,
            samples,
        })
    }

    /// The method maps a raw luminance sample to its marking. Every byte maps to something;
    /// values outside the authored table degrade to OffTrack.
    fn marking_of(sample: u8) -> Marking {
        match sample {
            255 => Marking::Track,
            210 => Marking::StartLine,
            220 => Marking::FinishLine,
            200 => Marking::OffTrack,
            27 => Marking::Unused,
            230 => Marking::Checkpoint,
            _ => Marking::OffTrack,
        }
    }

    /// classify converts world coordinates to raster coordinates (divide by render scale,
    /// truncate) and returns the marking of the hit pixel. Out-of-bounds queries are not an
    /// error; they classify as OffTrack.
    pub fn classify(&self, world_x: f64, world_y: f64) -> Marking {
        let x = (world_x / self.scale) as i64;
        let y = (world_y / self.scale) as i64;

        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return Marking::OffTrack;
        }

        Self::marking_of(self.samples[y as usize * self.width + x as usize])
    }

    /// has_marking reports whether the hit pixel carries one of the authored marking values.
    /// Unrecognized background bytes and out-of-bounds points do not. This is the difference
    /// between a barrier (authored OffTrack) and plain scenery ground.
    pub fn has_marking(&self, world_x: f64, world_y: f64) -> bool {
        let x = (world_x / self.scale) as i64;
        let y = (world_y / self.scale) as i64;

        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }

        matches!(
            self.samples[y as usize * self.width + x as usize],
            255 | 210 | 220 | 200 | 27 | 230
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// scaled_size returns the world-space extents covered by the mask.
    pub fn scaled_size(&self) -> (f64, f64) {
        (self.width as f64 * self.scale, self.height as f64 * self.scale)
    }
}
