use crate::core::hitbox::{BACK_LEFT, BACK_RIGHT, FRONT_LEFT, FRONT_RIGHT};
use crate::core::lap::LapState;
use crate::core::track_mask::{Marking, TrackMask};
use crate::core::vehicle::Vehicle;
use helpers::general::{lerp, snap_to_zero};

/// CornerState is the per-corner classification the collision and lap logic act on. It is a
/// closed variant so every dispatch over it stays exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerState {
    Clear,
    Start,
    Finish,
    Wall,
    Unused,
    Checkpoint,
}

impl CornerState {
    fn from_marking(marking: Marking) -> CornerState {
        match marking {
            Marking::Track => CornerState::Clear,
            Marking::StartLine => CornerState::Start,
            Marking::FinishLine => CornerState::Finish,
            Marking::OffTrack => CornerState::Wall,
            Marking::Unused => CornerState::Unused,
            Marking::Checkpoint => CornerState::Checkpoint,
        }
    }
}

/// classify_corners maps the four corner points onto corner states, applying the two lap
/// gates: the finish line is solid until the checkpoint was taken this lap, and the
/// checkpoint is solid until a lap has started. Both prevent progression shortcuts.
pub fn classify_corners(
    mask: &TrackMask,
    corners: &[(f64, f64); 4],
    lap: &LapState,
) -> [CornerState; 4] {
    let mut states = [CornerState::Clear; 4];

    for (i, (x, y)) in corners.iter().enumerate() {
        let mut state = CornerState::from_marking(mask.classify(*x, *y));

        if state == CornerState::Finish && !lap.checkpoint_reached {
            state = CornerState::Wall;
        }
        if state == CornerState::Checkpoint && !lap.lap_started {
            state = CornerState::Wall;
        }

        states[i] = state;
    }

    states
}

/// Strength of a single-tick push-back target vector.
pub const PUSH_STRENGTH: f64 = 2.0;
/// Smoothing factor pulling the running correction toward the target.
pub const CORRECTION_LERP: f64 = 0.4;
/// Per-tick decay of the correction once the car is free again.
pub const CORRECTION_DECAY: f64 = 0.75;
/// Below this magnitude the correction snaps to zero.
pub const CORRECTION_SNAP: f64 = 0.01;
/// A bump cue fires on the first frame of a collision streak and every Nth frame after.
pub const BUMP_FRAME_INTERVAL: u32 = 20;

/// Floor applied to the reflected speed when a full front or rear pair hits a wall.
const REFLECT_SPEED_FLOOR: f64 = 30.0;
/// Impact factor above which a hard stop leaves the car crashed.
const CRASH_IMPACT_THRESHOLD: f64 = 0.7;

/// CollisionOutcome reports what the resolver did this tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionOutcome {
    pub collided: bool,
    pub bump: bool,
}

/// CollisionResolver classifies wall contact severity and applies the velocity, speed and
/// angular corrections, plus the smoothed positional push-back that keeps the car visually
/// out of walls without a hard physics solve.
#[derive(Debug, Clone, Default)]
pub struct CollisionResolver {
    pub correction: (f64, f64),
    collision_frames: u32,
}

impl CollisionResolver {
    pub fn new() -> CollisionResolver {
        CollisionResolver::default()
    }

    /// The method resolves one tick of collision response. `states`/`future_states` are the
    /// gated classifications of the current and one-step-ahead corners; `corners` are the
    /// current corner positions the push-back is derived from.
    pub fn resolve(
        &mut self,
        vehicle: &mut Vehicle,
        states: &[CornerState; 4],
        future_states: &[CornerState; 4],
        corners: &[(f64, f64); 4],
        dt: f64,
    ) -> CollisionOutcome {
        let collided = states.iter().any(|&s| s == CornerState::Wall);
        let all_wall = states.iter().all(|&s| s == CornerState::Wall);

        if collided {
            self.update_correction_target(vehicle.position, states, corners);
        } else {
            self.correction.0 = snap_to_zero(self.correction.0 * CORRECTION_DECAY, CORRECTION_SNAP);
            self.correction.1 = snap_to_zero(self.correction.1 * CORRECTION_DECAY, CORRECTION_SNAP);
            self.collision_frames = 0;
        }

        let mut bump = false;

        // the all-wall case is handled purely by the push-back correction; directional
        // response and the bump cadence are suppressed
        if collided && !all_wall {
            if self.collision_frames == 0 || self.collision_frames % BUMP_FRAME_INTERVAL == 0 {
                bump = true;
            }
            self.collision_frames += 1;

            let front = states[FRONT_LEFT] == CornerState::Wall
                && states[FRONT_RIGHT] == CornerState::Wall;
            let rear = states[BACK_LEFT] == CornerState::Wall
                && states[BACK_RIGHT] == CornerState::Wall;

            if front {
                Self::reflect(vehicle, dt, -1.0);
            } else if rear {
                Self::reflect(vehicle, dt, 1.0);
            } else if states[FRONT_LEFT] == CornerState::Wall {
                Self::corner_collision(vehicle, FRONT_LEFT, FRONT_RIGHT, future_states, dt, -1.0, false);
            } else if states[FRONT_RIGHT] == CornerState::Wall {
                Self::corner_collision(vehicle, FRONT_RIGHT, FRONT_LEFT, future_states, dt, 1.0, false);
            } else if states[BACK_LEFT] == CornerState::Wall {
                Self::corner_collision(vehicle, BACK_LEFT, BACK_RIGHT, future_states, dt, 1.0, true);
            } else if states[BACK_RIGHT] == CornerState::Wall {
                Self::corner_collision(vehicle, BACK_RIGHT, BACK_LEFT, future_states, dt, -1.0, true);
            }
        }

        CollisionOutcome { collided, bump }
    }

    /// Accumulates a vector from every wall corner back toward the hitbox center, normalizes
    /// it (a zero-length sum no-ops rather than dividing by zero) and smooths it into the
    /// running correction.
    fn update_correction_target(
        &mut self,
        center: (f64, f64),
        states: &[CornerState; 4],
        corners: &[(f64, f64); 4],
    ) {
        let mut target = (0.0, 0.0);

        for (i, &state) in states.iter().enumerate() {
            if state == CornerState::Wall {
                target.0 -= corners[i].0 - center.0;
                target.1 -= corners[i].1 - center.1;
            }
        }

        let mag = target.0.hypot(target.1);
        if mag > 0.0 {
            target.0 = target.0 / mag * PUSH_STRENGTH;
            target.1 = target.1 / mag * PUSH_STRENGTH;
        }

        self.correction.0 = lerp(self.correction.0, target.0, CORRECTION_LERP);
        self.correction.1 = lerp(self.correction.1, target.1, CORRECTION_LERP);
    }

    /// A full corner pair in the wall reflects the car along its heading: the speed is
    /// forced to a small magnitude with the given sign and the velocity recomputed.
    fn reflect(vehicle: &mut Vehicle, dt: f64, sign: f64) {
        vehicle.speed = (vehicle.speed.abs() / 10.0)
            .max(REFLECT_SPEED_FLOOR)
            .copysign(sign);
        let (cos_d, sin_d) = vehicle.heading_trig();
        vehicle.velocity = (vehicle.speed * cos_d * dt, vehicle.speed * sin_d * dt);
    }

    /// Single-corner contact: a glancing bounce when only the current corner touches, a hard
    /// stop when the one-step-ahead prediction has both the primary and secondary corner in
    /// the wall. Front corners push at 160 deg off heading (behind the car), rear corners at
    /// 45 deg to reflect the shorter rear overhang.
    fn corner_collision(
        vehicle: &mut Vehicle,
        primary: usize,
        secondary: usize,
        future_states: &[CornerState; 4],
        dt: f64,
        spin_direction: f64,
        is_rear: bool,
    ) {
        let impact_factor = (vehicle.speed / vehicle.speed_cap).abs();
        let spin_impulse = spin_direction * vehicle.collision_spin_force * impact_factor;

        let push_angle_offset = if is_rear {
            45.0 * -spin_direction
        } else {
            160.0 * spin_direction
        };
        let push_angle_rad = (vehicle.direction + push_angle_offset).to_radians();

        let push_magnitude;
        if future_states[primary] == CornerState::Wall
            && future_states[secondary] == CornerState::Wall
        {
            // hard stop: overwrite the spin instead of accumulating it
            vehicle.angular_velocity = spin_impulse * impact_factor * 45.0 * -1.0;
            let mut magnitude = vehicle.collision_push_force * impact_factor;
            if vehicle.crashed {
                magnitude /= 20.0;
            }
            if impact_factor > CRASH_IMPACT_THRESHOLD {
                vehicle.crashed = true;
            }
            push_magnitude = magnitude;
        } else {
            vehicle.angular_velocity += spin_impulse;
            push_magnitude = vehicle.collision_push_force * impact_factor;
        }

        vehicle.velocity.0 += push_angle_rad.cos() * push_magnitude * dt;
        vehicle.velocity.1 += push_angle_rad.sin() * push_magnitude * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vehicle::VehiclePars;
    use approx::assert_relative_eq;

    const DT: f64 = 1.0 / 60.0;

    fn test_vehicle() -> Vehicle {
        Vehicle::new(&VehiclePars {
            power: 100.0,
            friction: 0.05,
            scale: 4.5,
            sprite_width: 32.0,
            sprite_height: 32.0,
        })
    }

    fn square_corners(center: (f64, f64), half: f64) -> [(f64, f64); 4] {
        [
            (center.0 - half, center.1 + half),
            (center.0 + half, center.1 + half),
            (center.0 + half, center.1 - half),
            (center.0 - half, center.1 - half),
        ]
    }

    fn lap_racing() -> LapState {
        LapState {
            lap_started: true,
            checkpoint_reached: true,
            lap_finished: false,
            timer: 0.0,
        }
    }

    #[test]
    fn finish_is_solid_before_checkpoint() {
        let mask = TrackMask::new(1, 1, 1.0, vec![220]).unwrap();
        let corners = [(0.5, 0.5); 4];

        let mut lap = LapState::default();
        lap.lap_started = true;
        let states = classify_corners(&mask, &corners, &lap);
        assert!(states.iter().all(|&s| s == CornerState::Wall));

        lap.checkpoint_reached = true;
        let states = classify_corners(&mask, &corners, &lap);
        assert!(states.iter().all(|&s| s == CornerState::Finish));
    }

    #[test]
    fn checkpoint_is_solid_before_lap_start() {
        let mask = TrackMask::new(1, 1, 1.0, vec![230]).unwrap();
        let corners = [(0.5, 0.5); 4];

        let states = classify_corners(&mask, &corners, &LapState::default());
        assert!(states.iter().all(|&s| s == CornerState::Wall));

        let states = classify_corners(&mask, &corners, &lap_racing());
        assert!(states.iter().all(|&s| s == CornerState::Checkpoint));
    }

    #[test]
    fn all_wall_applies_push_back_only() {
        let mut resolver = CollisionResolver::new();
        let mut vehicle = test_vehicle();
        vehicle.speed = 500.0;
        vehicle.angular_velocity = 0.0;
        let velocity_before = vehicle.velocity;

        // corners all on one side of the center, so the push-back target is non-zero
        let corners = [(10.0, 0.0), (12.0, 2.0), (12.0, -2.0), (10.0, -1.0)];
        let states = [CornerState::Wall; 4];

        let outcome = resolver.resolve(&mut vehicle, &states, &states, &corners, DT);

        assert!(outcome.collided);
        assert!(!outcome.bump);
        assert_relative_eq!(vehicle.speed, 500.0);
        assert_relative_eq!(vehicle.angular_velocity, 0.0);
        assert_eq!(vehicle.velocity, velocity_before);
        assert!(resolver.correction.0.hypot(resolver.correction.1) > 0.0);
        // correction points away from the wall corners (negative x here)
        assert!(resolver.correction.0 < 0.0);
    }

    #[test]
    fn front_pair_reflects_speed_with_floor() {
        let mut resolver = CollisionResolver::new();
        let mut vehicle = test_vehicle();
        vehicle.speed = 500.0;

        let mut states = [CornerState::Clear; 4];
        states[FRONT_LEFT] = CornerState::Wall;
        states[FRONT_RIGHT] = CornerState::Wall;

        resolver.resolve(
            &mut vehicle,
            &states,
            &[CornerState::Clear; 4],
            &square_corners((0.0, 0.0), 5.0),
            DT,
        );

        assert_relative_eq!(vehicle.speed, -50.0);
        assert_relative_eq!(vehicle.velocity.0, -50.0 * DT, epsilon = 1e-9);

        // below the floor the magnitude clamps to 30
        vehicle.speed = 100.0;
        resolver.resolve(
            &mut vehicle,
            &states,
            &[CornerState::Clear; 4],
            &square_corners((0.0, 0.0), 5.0),
            DT,
        );
        assert_relative_eq!(vehicle.speed, -30.0);
    }

    #[test]
    fn rear_pair_reflects_speed_forward() {
        let mut resolver = CollisionResolver::new();
        let mut vehicle = test_vehicle();
        vehicle.speed = -300.0;

        let mut states = [CornerState::Clear; 4];
        states[BACK_LEFT] = CornerState::Wall;
        states[BACK_RIGHT] = CornerState::Wall;

        resolver.resolve(
            &mut vehicle,
            &states,
            &[CornerState::Clear; 4],
            &square_corners((0.0, 0.0), 5.0),
            DT,
        );

        assert_relative_eq!(vehicle.speed, 30.0);
    }

    #[test]
    fn soft_graze_accumulates_spin() {
        let mut resolver = CollisionResolver::new();
        let mut vehicle = test_vehicle();
        vehicle.speed = 500.0;
        vehicle.angular_velocity = 3.0;

        let mut states = [CornerState::Clear; 4];
        states[FRONT_LEFT] = CornerState::Wall;

        resolver.resolve(
            &mut vehicle,
            &states,
            &[CornerState::Clear; 4],
            &square_corners((0.0, 0.0), 5.0),
            DT,
        );

        // spin_impulse = -1 * 20 * 0.5 = -10, accumulated onto the existing 3
        assert_relative_eq!(vehicle.angular_velocity, -7.0);
        assert!(!vehicle.crashed);
    }

    #[test]
    fn hard_stop_overwrites_spin_and_crashes_at_high_impact() {
        let mut resolver = CollisionResolver::new();
        let mut vehicle = test_vehicle();
        vehicle.speed = 800.0; // impact factor 0.8 > 0.7
        vehicle.angular_velocity = 3.0;

        let mut states = [CornerState::Clear; 4];
        states[FRONT_RIGHT] = CornerState::Wall;
        let mut future = [CornerState::Clear; 4];
        future[FRONT_RIGHT] = CornerState::Wall;
        future[FRONT_LEFT] = CornerState::Wall;

        resolver.resolve(
            &mut vehicle,
            &states,
            &future,
            &square_corners((0.0, 0.0), 5.0),
            DT,
        );

        // spin_impulse = 1 * 20 * 0.8 = 16; overwritten value is 16 * 0.8 * 45 * -1
        assert_relative_eq!(vehicle.angular_velocity, -576.0);
        assert!(vehicle.crashed);
    }

    #[test]
    fn hard_stop_below_threshold_does_not_crash() {
        let mut resolver = CollisionResolver::new();
        let mut vehicle = test_vehicle();
        vehicle.speed = 500.0; // impact factor 0.5

        let mut states = [CornerState::Clear; 4];
        states[BACK_RIGHT] = CornerState::Wall;
        let mut future = [CornerState::Clear; 4];
        future[BACK_RIGHT] = CornerState::Wall;
        future[BACK_LEFT] = CornerState::Wall;

        resolver.resolve(
            &mut vehicle,
            &states,
            &future,
            &square_corners((0.0, 0.0), 5.0),
            DT,
        );

        assert!(!vehicle.crashed);
    }

    #[test]
    fn correction_decays_and_snaps_when_clear() {
        let mut resolver = CollisionResolver::new();
        resolver.correction = (1.0, 0.0);
        let mut vehicle = test_vehicle();

        let clear = [CornerState::Clear; 4];
        resolver.resolve(
            &mut vehicle,
            &clear,
            &clear,
            &square_corners((0.0, 0.0), 5.0),
            DT,
        );
        assert_relative_eq!(resolver.correction.0, 0.75);

        // repeated decay eventually snaps to exactly zero
        for _ in 0..30 {
            resolver.resolve(
                &mut vehicle,
                &clear,
                &clear,
                &square_corners((0.0, 0.0), 5.0),
                DT,
            );
        }
        assert_eq!(resolver.correction, (0.0, 0.0));
    }

    #[test]
    fn bump_fires_on_first_frame_and_every_twentieth() {
        let mut resolver = CollisionResolver::new();
        let mut vehicle = test_vehicle();
        vehicle.speed = 400.0;

        let mut states = [CornerState::Clear; 4];
        states[FRONT_LEFT] = CornerState::Wall;
        let corners = square_corners((0.0, 0.0), 5.0);

        let mut bump_frames = Vec::new();
        for frame in 0..41 {
            let outcome =
                resolver.resolve(&mut vehicle, &states, &[CornerState::Clear; 4], &corners, DT);
            if outcome.bump {
                bump_frames.push(frame);
            }
        }

        assert_eq!(bump_frames, vec![0, 20, 40]);
    }
}
