use serde::{Deserialize, Serialize};

/// Kind of a notable moment during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    LapCompleted,
    Crash,
}

/// * `kind` - What happened
/// * `lap` - Lap number the event occurred on (1-based)
/// * `time_s` - (s) Session time of the event
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionEvent {
    pub kind: EventKind,
    pub lap: u32,
    pub time_s: f64,
}

/// * `track_name` - Name of the driven track
/// * `lap_times` - (s) Time of every completed lap in order
/// * `total_time` - (s) Sum over all completed laps
/// * `crash_count` - Number of crashes during the session
/// * `top_speed` - (units/s) Highest speed magnitude reached
/// * `speed_trace` - (s, units/s) Sampled speed over session time, for post-run plotting
/// * `events` - Notable moments (lap completions, crashes) in session order
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionResult {
    pub track_name: String,
    pub lap_times: Vec<f64>,
    pub total_time: f64,
    pub crash_count: u32,
    pub top_speed: f64,
    pub speed_trace: Vec<(f64, f64)>,
    pub events: Vec<SessionEvent>,
}

impl SessionResult {
    /// race_finished reports whether the full lap count was driven (the session may also end
    /// on the time cap).
    pub fn race_finished(&self, total_laps: u32) -> bool {
        self.lap_times.len() as u32 >= total_laps
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------------------------------------
    // PRINTING ---------------------------------------------------------------------------------------------------------------------------------------------------------------
    // ------------------------------------------------------------------------------------------------------------------------------------------------------------------------

    pub fn print_result(&self) {
        println!("RESULT: Track: {}", self.track_name);
        for (i, lap_time) in self.lap_times.iter().enumerate() {
            println!("RESULT: Lap {}: {:.3}s", i + 1, lap_time);
        }
        println!("RESULT: Total: {:.3}s", self.total_time);
        println!("RESULT: Top speed: {:.1}", self.top_speed);
        println!("RESULT: Crashes: {}", self.crash_count);
    }
}
