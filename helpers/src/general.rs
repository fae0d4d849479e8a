use std::f64::consts::PI;

/// wrap_deg normalizes an angle in degrees to the range [0.0, 360.0[.
pub fn wrap_deg(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// wrap_rad_pi normalizes an angle in radians to the range [-PI, PI[.
pub fn wrap_rad_pi(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

/// signed_angle_diff_rad returns the signed difference a - b in radians, wrapped to [-PI, PI[.
pub fn signed_angle_diff_rad(a: f64, b: f64) -> f64 {
    wrap_rad_pi(a - b)
}

/// lerp returns the linear interpolation between a and b at factor t.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    (1.0 - t) * a + t * b
}

/// snap_to_zero returns 0.0 if the magnitude of x is below eps, x otherwise.
pub fn snap_to_zero(x: f64, eps: f64) -> f64 {
    if x.abs() < eps {
        0.0
    } else {
        x
    }
}
