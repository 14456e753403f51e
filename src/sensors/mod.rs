pub mod heading;
pub mod step_detector;

use std::time::Duration;

use serde::Serialize;

pub use heading::HeadingTracker;
pub use step_detector::{StepDetector, StepEvent};

/// One accelerometer reading in units of g
///
/// `timestamp` is monotonic time since the stream started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub timestamp: Duration,
}

impl AccelSample {
    pub fn new(x: f64, y: f64, z: f64, timestamp: Duration) -> Self {
        Self { x, y, z, timestamp }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Horizontal magnetometer components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagSample {
    pub x: f64,
    pub y: f64,
    pub timestamp: Duration,
}

impl MagSample {
    pub fn new(x: f64, y: f64, timestamp: Duration) -> Self {
        Self { x, y, timestamp }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Accelerometer,
    Magnetometer,
}

/// What a sensor source delivers to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    Accelerometer(AccelSample),
    Magnetometer(MagSample),
    /// The subscription failed; no more samples follow until restarted
    StreamError { kind: SensorKind, message: String },
}

impl SensorEvent {
    pub fn timestamp(&self) -> Option<Duration> {
        match self {
            Self::Accelerometer(s) => Some(s.timestamp),
            Self::Magnetometer(s) => Some(s.timestamp),
            Self::StreamError { .. } => None,
        }
    }
}
