//! Tuning constants for the navigation pipeline
//!
//! Defaults for the configuration sections in [`crate::config`]. Values that
//! came from field testing on phones are noted as such; everything else is a
//! safety bound.

/// Maximum number of frontier pops before A* gives up with
/// [`crate::error::PathError::SearchTruncated`].
pub const DEFAULT_EXPANSION_BUDGET: usize = 10_000;

/// Accelerometer magnitude (in g) above which a footfall is latched.
/// Resting gravity is 1.0 g; the margin was tuned for sensitivity on phones.
pub const STEP_THRESHOLD_G: f64 = 1.05;

/// Minimum time between two counted steps (about 4 steps/s upper cadence).
pub const MIN_STEP_INTERVAL_MS: u64 = 250;

/// Process noise for the magnitude filter. Much smaller than the measurement
/// noise so the filtered magnitude is smooth but still tracks footfalls.
pub const STEP_FILTER_PROCESS_NOISE: f64 = 0.01;

/// Measurement noise for the magnitude filter (typical phone accelerometer).
pub const STEP_FILTER_MEASUREMENT_NOISE: f64 = 0.1;

/// Accelerometer sampling period (about 33 Hz).
pub const ACCEL_SAMPLE_PERIOD_MS: u64 = 30;

/// Magnetometer sampling period.
pub const MAG_SAMPLE_PERIOD_MS: u64 = 100;

/// Exponential smoothing factor for the heading tracker.
pub const HEADING_SMOOTHING_ALPHA: f64 = 0.1;

/// Steps walked per waypoint when advancing on a fixed schedule.
pub const STEPS_PER_WAYPOINT: u32 = 8;

/// Average adult stride in meters.
pub const DEFAULT_STRIDE_LENGTH_M: f64 = 0.7;

/// Walking speed used for arrival time estimates.
pub const WALKING_SPEED_MPS: f64 = 1.4;

/// Relative angle within which the user is considered to face the next node.
pub const TURN_THRESHOLD_DEG: f64 = 20.0;

/// Distance to the destination under which guidance reports "arriving".
pub const ARRIVING_DISTANCE: f64 = 5.0;

/// How long after the last step the user still counts as moving.
pub const MOVEMENT_TIMEOUT_MS: u64 = 2000;

/// Guard against dividing by a zero-length segment or stride.
pub const DISTANCE_EPSILON: f64 = 1e-9;
