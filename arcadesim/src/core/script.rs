use crate::core::vehicle::InputIntent;
use serde::Deserialize;

/// * `t` - (s) Session time at which this input block takes effect
/// * `throttle` - Throttle held from `t` onward
/// * `brake` - Brake held from `t` onward
/// * `steer` - Steering value held from `t` onward (+1 left, -1 right, 0 straight)
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ScriptEntry {
    pub t: f64,
    #[serde(default)]
    pub throttle: bool,
    #[serde(default)]
    pub brake: bool,
    #[serde(default)]
    pub steer: i8,
}

/// DriveScript replays a pre-authored input sequence. Each entry holds its inputs until the
/// next entry's time is reached, so the file reads as a sparse timeline.
#[derive(Debug, Clone, Default)]
pub struct DriveScript {
    entries: Vec<ScriptEntry>,
}

impl DriveScript {
    pub fn new(mut entries: Vec<ScriptEntry>) -> DriveScript {
        entries.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal));
        DriveScript { entries }
    }

    /// intent_at returns the inputs active at session time `t`: the latest entry whose time
    /// has been reached, or neutral inputs before the first entry.
    pub fn intent_at(&self, t: f64) -> InputIntent {
        let mut active: Option<&ScriptEntry> = None;
        for entry in &self.entries {
            if entry.t <= t {
                active = Some(entry);
            } else {
                break;
            }
        }

        match active {
            Some(entry) => InputIntent {
                throttle: entry.throttle,
                brake: entry.brake,
                steer: entry.steer,
            },
            None => InputIntent::default(),
        }
    }
}
