use super::MagSample;
use crate::config::HeadingConfig;
use crate::signal_processing::{angle_difference, vector_angle, wrap_degrees};

/// Smoothed compass heading from magnetometer samples
///
/// Raw heading is `atan2(y, x)` in degrees. Smoothing is exponential, but it
/// is applied to the shortest signed angle between the new reading and the
/// current estimate, so readings either side of north (e.g. 350° then 10°)
/// pull the estimate through 0° rather than swinging through 180°.
///
/// The first sample after construction or reset is taken verbatim. Readings
/// that are not finite are dropped and leave the estimate unchanged.
#[derive(Debug, Clone)]
pub struct HeadingTracker {
    alpha: f64,
    smoothed: Option<f64>,
}

impl HeadingTracker {
    pub fn new(config: &HeadingConfig) -> Self {
        Self::with_alpha(config.alpha)
    }

    /// # Arguments
    /// * `alpha` - Smoothing factor in (0, 1]; 1 disables smoothing
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            smoothed: None,
        }
    }

    /// Process a magnetometer sample and return the smoothed heading
    pub fn process_sample(&mut self, sample: &MagSample) -> Option<f64> {
        self.update(vector_angle(sample.x, sample.y))
    }

    /// Feed a raw heading in degrees and return the smoothed heading
    ///
    /// Returns `None` only while no finite reading has been seen.
    pub fn update(&mut self, raw_degrees: f64) -> Option<f64> {
        if !raw_degrees.is_finite() {
            log::trace!("Skipping non-finite heading {}", raw_degrees);
            return self.smoothed;
        }
        let raw = wrap_degrees(raw_degrees);

        let smoothed = match self.smoothed {
            None => raw,
            Some(current) => wrap_degrees(current + self.alpha * angle_difference(raw, current)),
        };
        self.smoothed = Some(smoothed);
        self.smoothed
    }

    /// Smoothed heading in `[0, 360)`, `None` before the first sample
    pub fn heading(&self) -> Option<f64> {
        self.smoothed
    }

    pub fn reset(&mut self) {
        self.smoothed = None;
    }
}
