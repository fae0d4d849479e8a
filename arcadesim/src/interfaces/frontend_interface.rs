use crate::post::session_result::SessionResult;

/// (1/s) Upper bound on snapshot sends toward a frontend; the simulation itself may tick
/// much faster.
pub const MAX_FRONTEND_UPDATE_FREQUENCY: f64 = 20.0;

/// A single tire-mark decal as shown by a frontend.
#[derive(Debug, Clone, Copy)]
pub struct TrailPoint {
    pub position: (f64, f64),
    pub opacity: f64,
}

/// * `position` - (world units) Car center
/// * `direction` - (deg) Car heading
/// * `speed` - (units/s) Signed scalar speed
/// * `drifting` - Whether the car is currently sliding
/// * `crashed` - Whether the car is wrecked and awaiting respawn
#[derive(Debug, Clone, Copy)]
pub struct VehicleView {
    pub position: (f64, f64),
    pub direction: f64,
    pub speed: f64,
    pub drifting: bool,
    pub crashed: bool,
}

/// SessionSnapshot is the full frontend-facing state of one simulation step. The final
/// snapshot of a session carries the result; every earlier one carries `None`.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_time: f64,
    pub vehicle: VehicleView,
    pub correction: (f64, f64),
    pub current_lap: u32,
    pub total_laps: u32,
    pub lap_timer: f64,
    pub lap_started: bool,
    pub bump: bool,
    pub trail: Vec<TrailPoint>,
    /// Static prop positions scattered at session start; identical in every snapshot.
    pub scenery: Vec<(f64, f64)>,
    pub final_result: Option<SessionResult>,
}
