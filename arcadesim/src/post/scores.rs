use crate::post::session_result::SessionResult;
use anyhow::Context;
use std::fs::OpenOptions;
use std::path::Path;

/// Number of tracks the score file holds a slot for.
const TRACK_SLOTS: usize = 4;

/// ScoreBoard persists the best run per track. One entry per map index; an entry is either
/// empty (no run recorded yet) or `[total_time, lap_1, lap_2, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBoard {
    entries: Vec<Vec<f64>>,
}

impl ScoreBoard {
    pub fn new() -> ScoreBoard {
        ScoreBoard {
            entries: vec![Vec::new(); TRACK_SLOTS],
        }
    }

    /// load reads the score file. A missing file yields an empty board; an unreadable one is
    /// reset rather than aborting the run.
    pub fn load(filepath: &Path) -> ScoreBoard {
        let fh = match OpenOptions::new().read(true).open(filepath) {
            Ok(fh) => fh,
            Err(_) => return ScoreBoard::new(),
        };

        match serde_json::from_reader::<_, Vec<Vec<f64>>>(&fh) {
            Ok(entries) if entries.len() == TRACK_SLOTS => ScoreBoard { entries },
            _ => {
                println!(
                    "WARNING: Score file {} is corrupted, starting with an empty score board!",
                    filepath.display()
                );
                ScoreBoard::new()
            }
        }
    }

    pub fn save(&self, filepath: &Path) -> anyhow::Result<()> {
        let fh = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(filepath)
            .context(format!(
                "Failed to open score file {} for writing!",
                filepath.display()
            ))?;
        serde_json::to_writer(&fh, &self.entries).context(format!(
            "Failed to write score file {}!",
            filepath.display()
        ))?;
        Ok(())
    }

    /// best_total returns the recorded best total time for a track, if any.
    pub fn best_total(&self, map_index: usize) -> Option<f64> {
        self.entries.get(map_index).and_then(|e| e.first().copied())
    }

    /// update_best records the result if it beats the stored best total time for the track.
    /// Returns whether the board changed.
    pub fn update_best(&mut self, map_index: usize, result: &SessionResult) -> bool {
        if map_index >= self.entries.len() || result.lap_times.is_empty() {
            return false;
        }

        let improved = match self.best_total(map_index) {
            Some(best) => result.total_time < best,
            None => true,
        };

        if improved {
            let mut entry = Vec::with_capacity(result.lap_times.len() + 1);
            entry.push(result.total_time);
            entry.extend_from_slice(&result.lap_times);
            self.entries[map_index] = entry;
        }
        improved
    }
}

impl Default for ScoreBoard {
    fn default() -> ScoreBoard {
        ScoreBoard::new()
    }
}
