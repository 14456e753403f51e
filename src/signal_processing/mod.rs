pub mod angle;
pub mod kalman;
pub mod threshold_detector;

pub use angle::{
    angle_difference, compass_bearing, vector_angle, wrap_degrees, wrap_degrees_signed,
};
pub use kalman::{FilterState, ScalarKalman};
pub use threshold_detector::FallingEdgeDetector;
