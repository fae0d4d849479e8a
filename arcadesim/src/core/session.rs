use crate::core::collision::{classify_corners, CollisionResolver};
use crate::core::hitbox::{BACK_LEFT, BACK_RIGHT};
use crate::core::lap::LapState;
use crate::core::scenery;
use crate::core::track_mask::{TrackMask, TrackPars};
use crate::core::trail::Trail;
use crate::core::vehicle::{InputIntent, Vehicle, VehiclePars};
use crate::interfaces::frontend_interface::{SessionSnapshot, TrailPoint, VehicleView};
use crate::post::session_result::{EventKind, SessionEvent, SessionResult};

/// (s) Time a wrecked car sits before it is respawned at the spawn point.
const CRASH_RESPAWN_DELAY: f64 = 5.0;
/// Per-tick velocity damping of a wrecked car sliding out.
const CRASH_VELOCITY_DAMPING: f64 = 0.92;
/// Decorative props scattered over the track background at session start.
const SCENERY_PROP_COUNT: usize = 60;

/// TickResult reports the externally visible outcome of one simulation step.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickResult {
    /// World displacement applied this tick (velocity plus wall correction).
    pub world_delta: (f64, f64),
    pub collided: bool,
    pub bump: bool,
}

/// RaceSession owns the full state of one race: the car, the track mask, the collision
/// resolver and the lap bookkeeping. It advances in fixed order per tick and records the
/// statistics the post-processing consumes.
#[derive(Debug, Clone)]
pub struct RaceSession {
    pub vehicle: Vehicle,
    mask: TrackMask,
    lap: LapState,
    resolver: CollisionResolver,
    trail: Trail,
    scenery: Vec<(f64, f64)>,

    track_name: String,
    spawn_point: (f64, f64),
    spawn_direction: f64,
    total_laps: u32,
    print_events: bool,

    current_lap: u32,
    lap_times: Vec<f64>,
    race_finished: bool,
    session_time: f64,
    time_after_crash: f64,
    was_crashed: bool,
    last_bump: bool,

    crash_count: u32,
    top_speed: f64,
    speed_trace: Vec<(f64, f64)>,
    events: Vec<SessionEvent>,
}

impl RaceSession {
    pub fn new(
        track_pars: &TrackPars,
        vehicle_pars: &VehiclePars,
        mask: TrackMask,
        print_events: bool,
    ) -> RaceSession {
        let spawn_point = (track_pars.spawn_point[0], track_pars.spawn_point[1]);
        let mut vehicle = Vehicle::new(vehicle_pars);
        vehicle.teleport(spawn_point, track_pars.spawn_direction);

        let scenery = scenery::scatter(&mask, SCENERY_PROP_COUNT, &mut rand::thread_rng());

        RaceSession {
            vehicle,
            mask,
            lap: LapState::new(),
            resolver: CollisionResolver::new(),
            trail: Trail::new(),
            scenery,
            track_name: track_pars.name.clone(),
            spawn_point,
            spawn_direction: track_pars.spawn_direction,
            total_laps: track_pars.total_laps,
            print_events,
            current_lap: 1,
            lap_times: Vec::new(),
            race_finished: false,
            session_time: 0.0,
            time_after_crash: 0.0,
            was_crashed: false,
            last_bump: false,
            crash_count: 0,
            top_speed: 0.0,
            speed_trace: Vec::new(),
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------------------------------------
    // MAIN METHOD ------------------------------------------------------------------------------------------------------------------------------------------------------------
    // ------------------------------------------------------------------------------------------------------------------------------------------------------------------------

    /// The method advances the race by one fixed step: locomotion, corner classification,
    /// collision response, lap progression, race bookkeeping and finally the position
    /// integration. A non-positive step leaves the session untouched.
    pub fn tick(&mut self, dt: f64, intent: InputIntent) -> TickResult {
        if dt <= 0.0 || self.race_finished {
            return TickResult::default();
        }

        self.session_time += dt;

        self.vehicle.update(dt, intent);

        let corners = self.vehicle.current_corners();
        let states = classify_corners(&self.mask, &corners, &self.lap);
        let future_corners = self.vehicle.predicted_corners();
        let future_states = classify_corners(&self.mask, &future_corners, &self.lap);

        let outcome = self
            .resolver
            .resolve(&mut self.vehicle, &states, &future_states, &corners, dt);

        self.lap.apply_corners(&states, dt);
        self.update_race_progress(dt);

        self.trail.update(
            dt,
            self.vehicle.drifting,
            [corners[BACK_LEFT], corners[BACK_RIGHT]],
        );

        let world_delta = (
            self.vehicle.velocity.0 + self.resolver.correction.0,
            self.vehicle.velocity.1 + self.resolver.correction.1,
        );
        self.vehicle.position.0 += world_delta.0;
        self.vehicle.position.1 += world_delta.1;

        let speed_abs = self.vehicle.speed.abs();
        if speed_abs > self.top_speed {
            self.top_speed = speed_abs;
        }
        self.speed_trace.push((self.session_time, speed_abs));
        self.last_bump = outcome.bump;

        TickResult {
            world_delta,
            collided: outcome.collided,
            bump: outcome.bump,
        }
    }

    /// Lap accounting and the crash/respawn cycle.
    fn update_race_progress(&mut self, dt: f64) {
        if self.lap.take_finish() {
            let lap_time = self.lap.timer;
            self.lap_times.push(lap_time);
            self.events.push(SessionEvent {
                kind: EventKind::LapCompleted,
                lap: self.current_lap,
                time_s: self.session_time,
            });
            if self.print_events {
                println!(
                    "INFO: Lap {} completed in {:.3}s!",
                    self.current_lap, lap_time
                );
            }

            self.current_lap += 1;
            self.lap.timer = 0.0;
            if self.current_lap > self.total_laps {
                self.race_finished = true;
            }
        }

        if self.vehicle.crashed && !self.was_crashed {
            self.crash_count += 1;
            self.events.push(SessionEvent {
                kind: EventKind::Crash,
                lap: self.current_lap,
                time_s: self.session_time,
            });
            if self.print_events {
                println!("WARNING: Car wrecked on lap {}!", self.current_lap);
            }
        }
        self.was_crashed = self.vehicle.crashed;

        if self.vehicle.crashed {
            self.time_after_crash += dt;
            // damp both so the next locomotion step does not restore the old velocity
            self.vehicle.speed *= CRASH_VELOCITY_DAMPING;
            self.vehicle.velocity.0 *= CRASH_VELOCITY_DAMPING;
            self.vehicle.velocity.1 *= CRASH_VELOCITY_DAMPING;

            if self.time_after_crash >= CRASH_RESPAWN_DELAY {
                self.vehicle.teleport(self.spawn_point, self.spawn_direction);
                self.lap.timer = 0.0;
                self.time_after_crash = 0.0;
                self.was_crashed = false;
            }
        } else {
            self.time_after_crash = 0.0;
        }
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------------------------------------
    // ACCESSORS --------------------------------------------------------------------------------------------------------------------------------------------------------------
    // ------------------------------------------------------------------------------------------------------------------------------------------------------------------------

    pub fn race_finished(&self) -> bool {
        self.race_finished
    }

    pub fn session_time(&self) -> f64 {
        self.session_time
    }

    pub fn lap_times(&self) -> &[f64] {
        &self.lap_times
    }

    pub fn current_lap(&self) -> u32 {
        self.current_lap
    }

    /// scenery returns the prop positions scattered at session start.
    pub fn scenery(&self) -> &[(f64, f64)] {
        &self.scenery
    }

    /// snapshot assembles the frontend-facing view of the current step.
    pub fn snapshot(&self, final_result: Option<SessionResult>) -> SessionSnapshot {
        SessionSnapshot {
            session_time: self.session_time,
            vehicle: VehicleView {
                position: self.vehicle.position,
                direction: self.vehicle.direction,
                speed: self.vehicle.speed,
                drifting: self.vehicle.drifting,
                crashed: self.vehicle.crashed,
            },
            correction: self.resolver.correction,
            current_lap: self.current_lap,
            total_laps: self.total_laps,
            lap_timer: self.lap.timer,
            lap_started: self.lap.lap_started,
            bump: self.last_bump,
            trail: self
                .trail
                .active_decals()
                .map(|d| TrailPoint {
                    position: d.position,
                    opacity: d.opacity(),
                })
                .collect(),
            scenery: self.scenery.clone(),
            final_result,
        }
    }

    /// get_session_result folds the recorded statistics into the post-processing result.
    pub fn get_session_result(&self) -> SessionResult {
        SessionResult {
            track_name: self.track_name.clone(),
            lap_times: self.lap_times.clone(),
            total_time: self.lap_times.iter().sum(),
            crash_count: self.crash_count,
            top_speed: self.top_speed,
            speed_trace: self.speed_trace.clone(),
            events: self.events.clone(),
        }
    }
}
