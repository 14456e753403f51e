//! Degree-based angle arithmetic on the compass circle

/// Wrap an angle into `[0, 360)`
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Wrap an angle into `(-180, 180]`
pub fn wrap_degrees_signed(degrees: f64) -> f64 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Shortest signed rotation from `from` to `to`, in `(-180, 180]`
///
/// Positive means clockwise on a compass.
pub fn angle_difference(to: f64, from: f64) -> f64 {
    wrap_degrees_signed(to - from)
}

/// Angle of the vector `(x, y)` in degrees, wrapped into `[0, 360)`
pub fn vector_angle(x: f64, y: f64) -> f64 {
    wrap_degrees(y.atan2(x).to_degrees())
}

/// Compass bearing of a map displacement `(dx, dy)`
///
/// Map coordinates have `y` pointing down, so the math angle is rotated by a
/// quarter turn: `+x` is east (90°), `+y` is south (180°), `-y` is north (0°).
pub fn compass_bearing(dx: f64, dy: f64) -> f64 {
    wrap_degrees(dy.atan2(dx).to_degrees() + 90.0 + 360.0)
}
