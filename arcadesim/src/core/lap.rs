use crate::core::collision::CornerState;

/// Minimum lap time before a finish-line crossing counts. Filters out re-triggers while the
/// car is still sitting on the line.
const MIN_LAP_TIME: f64 = 1.0;

/// LapState tracks the progression gates of the current lap. The flags gate the track
/// triggers against shortcuts: a lap only counts after start, checkpoint and finish were
/// crossed in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LapState {
    pub lap_started: bool,
    pub checkpoint_reached: bool,
    pub lap_finished: bool,
    pub timer: f64,
}

impl LapState {
    pub fn new() -> LapState {
        LapState::default()
    }

    /// The method applies one tick of lap progression. Trigger priority is fixed: start line
    /// first, then checkpoint, then finish, with at most one trigger acted on per tick. The
    /// lap timer advances on every tick; crossing the start line resets it.
    pub fn apply_corners(&mut self, states: &[CornerState; 4], dt: f64) {
        let on_start = states.iter().any(|&s| s == CornerState::Start);
        let on_checkpoint = states.iter().any(|&s| s == CornerState::Checkpoint);
        let on_finish = states.iter().any(|&s| s == CornerState::Finish);

        if on_start {
            if !self.lap_started {
                self.lap_started = true;
                self.checkpoint_reached = false;
                self.timer = 0.0;
            }
        } else if on_checkpoint {
            if self.lap_started {
                self.checkpoint_reached = true;
            }
        } else if on_finish {
            if self.lap_started && self.checkpoint_reached && self.timer > MIN_LAP_TIME {
                self.lap_finished = true;
                self.lap_started = false;
                self.checkpoint_reached = false;
            }
        }

        self.timer += dt;
    }

    /// take_finish consumes a pending finish so the caller records the lap exactly once.
    pub fn take_finish(&mut self) -> bool {
        let finished = self.lap_finished;
        self.lap_finished = false;
        finished
    }
}
