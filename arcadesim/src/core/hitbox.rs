/// Corner indices of the collision rectangle. The order is fixed and load-bearing for the
/// collision dispatch and the lap triggers.
pub const BACK_LEFT: usize = 0;
pub const FRONT_LEFT: usize = 1;
pub const FRONT_RIGHT: usize = 2;
pub const BACK_RIGHT: usize = 3;

/// Hitbox extents as fixed ratios of the scaled sprite size.
pub const HITBOX_WIDTH_RATIO: f64 = 0.8;
pub const HITBOX_HEIGHT_RATIO: f64 = 0.4;

/// Extra width (world units) applied to the one-step-ahead corners so that fast approaches
/// are detected before penetration.
pub const PREDICTED_WIDTH_MARGIN: f64 = 160.0;

/// Hitbox is the car's collision rectangle. It is derived state: the center always follows
/// the vehicle position and the rotation follows the (negated) heading.
#[derive(Debug, Clone, Copy)]
pub struct Hitbox {
    pub width: f64,
    pub height: f64,
}

impl Hitbox {
    pub fn from_sprite_size(sprite_width: f64, sprite_height: f64, scale: f64) -> Hitbox {
        Hitbox {
            width: sprite_width * scale * HITBOX_WIDTH_RATIO,
            height: sprite_height * scale * HITBOX_HEIGHT_RATIO,
        }
    }

    /// corners_at returns the four rotated corner points for an arbitrary center and
    /// half-extents. Local corner order is (-w,h), (w,h), (w,-h), (-w,-h); the rotation is
    /// applied negated (screen-space convention, the hitbox rotation is stored as
    /// -direction).
    pub fn corners_at(
        center: (f64, f64),
        rotation_deg: f64,
        half_width: f64,
        half_height: f64,
    ) -> [(f64, f64); 4] {
        let theta = (-rotation_deg).to_radians();
        let (sin_t, cos_t) = theta.sin_cos();
        let (cx, cy) = center;

        let local = [
            (-half_width, half_height),
            (half_width, half_height),
            (half_width, -half_height),
            (-half_width, -half_height),
        ];

        let mut corners = [(0.0, 0.0); 4];
        for (i, (dx, dy)) in local.iter().enumerate() {
            corners[i] = (cx + dx * cos_t - dy * sin_t, cy + dx * sin_t + dy * cos_t);
        }
        corners
    }

    /// current_corners evaluates the real hitbox at the given center and heading.
    pub fn current_corners(&self, center: (f64, f64), direction_deg: f64) -> [(f64, f64); 4] {
        Self::corners_at(center, -direction_deg, self.width / 2.0, self.height / 2.0)
    }

    /// predicted_corners evaluates the widened hitbox one tick ahead: the center is offset
    /// by the per-tick velocity and the half-width grows by the prediction margin.
    pub fn predicted_corners(
        &self,
        center: (f64, f64),
        direction_deg: f64,
        velocity: (f64, f64),
    ) -> [(f64, f64); 4] {
        let future_center = (center.0 + velocity.0, center.1 + velocity.1);
        Self::corners_at(
            future_center,
            -direction_deg,
            (self.width + PREDICTED_WIDTH_MARGIN) / 2.0,
            self.height / 2.0,
        )
    }
}
