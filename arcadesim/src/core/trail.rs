/// Fixed decal pool size; the oldest decal is recycled once the pool is full.
pub const TRAIL_CAPACITY: usize = 500;
/// (s) Decal lifetime; opacity fades linearly to zero over it.
pub const TRAIL_LIFETIME: f64 = 2.0;

/// A single tire-mark decal left on the track.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailDecal {
    pub position: (f64, f64),
    pub age: f64,
    pub active: bool,
}

impl TrailDecal {
    /// opacity fades linearly with age; inactive decals are fully transparent.
    pub fn opacity(&self) -> f64 {
        if !self.active {
            return 0.0;
        }
        (1.0 - self.age / TRAIL_LIFETIME).max(0.0)
    }
}

/// Trail is the fixed-size ring buffer of tire marks laid down while drifting. Two decals
/// per tick (one per rear tire) while the slide lasts, aging out after their lifetime.
#[derive(Debug, Clone)]
pub struct Trail {
    decals: Vec<TrailDecal>,
    next: usize,
}

impl Trail {
    pub fn new() -> Trail {
        Trail {
            decals: vec![TrailDecal::default(); TRAIL_CAPACITY],
            next: 0,
        }
    }

    /// The method ages every live decal and, while the car is drifting, drops a fresh decal
    /// at each rear corner.
    pub fn update(&mut self, dt: f64, drifting: bool, rear_corners: [(f64, f64); 2]) {
        for decal in self.decals.iter_mut().filter(|d| d.active) {
            decal.age += dt;
            if decal.age >= TRAIL_LIFETIME {
                decal.active = false;
            }
        }

        if drifting {
            for corner in &rear_corners {
                self.decals[self.next] = TrailDecal {
                    position: *corner,
                    age: 0.0,
                    active: true,
                };
                self.next = (self.next + 1) % TRAIL_CAPACITY;
            }
        }
    }

    pub fn active_decals(&self) -> impl Iterator<Item = &TrailDecal> {
        self.decals.iter().filter(|d| d.active)
    }
}

impl Default for Trail {
    fn default() -> Trail {
        Trail::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn drifting_lays_two_decals_per_tick() {
        let mut trail = Trail::new();
        trail.update(DT, true, [(1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(trail.active_decals().count(), 2);

        trail.update(DT, false, [(5.0, 6.0), (7.0, 8.0)]);
        assert_eq!(trail.active_decals().count(), 2);
    }

    #[test]
    fn decals_expire_after_their_lifetime() {
        let mut trail = Trail::new();
        trail.update(DT, true, [(0.0, 0.0), (1.0, 0.0)]);

        let ticks = (TRAIL_LIFETIME / DT) as usize + 1;
        for _ in 0..ticks {
            trail.update(DT, false, [(0.0, 0.0), (0.0, 0.0)]);
        }
        assert_eq!(trail.active_decals().count(), 0);
    }

    #[test]
    fn opacity_fades_with_age() {
        let decal = TrailDecal {
            position: (0.0, 0.0),
            age: TRAIL_LIFETIME / 2.0,
            active: true,
        };
        assert_relative_eq!(decal.opacity(), 0.5);

        let expired = TrailDecal {
            age: TRAIL_LIFETIME + 1.0,
            active: true,
            ..decal
        };
        assert_relative_eq!(expired.opacity(), 0.0);
    }

    #[test]
    fn pool_recycles_oldest_slots_when_full() {
        let mut trail = Trail::new();
        // overfill by a full extra revolution of the ring
        for i in 0..TRAIL_CAPACITY {
            trail.update(0.0, true, [(i as f64, 0.0), (i as f64, 1.0)]);
        }
        assert_eq!(trail.active_decals().count(), TRAIL_CAPACITY);
    }
}
