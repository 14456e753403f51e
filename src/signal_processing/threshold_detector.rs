use std::time::Duration;

/// Hysteresis latch that fires on the falling edge of a threshold crossing
///
/// The latch sets when the signal rises above the threshold. When the signal
/// falls back below it, the detector fires if at least `min_interval` has
/// elapsed since the previous firing; otherwise the crossing is swallowed.
/// Either way the latch clears, so a single excursion above the threshold can
/// fire at most once.
///
/// Time comes from the sample timestamps, not from the sample count, so the
/// debounce holds even when the sensor delivers samples irregularly.
#[derive(Debug, Clone)]
pub struct FallingEdgeDetector {
    threshold: f64,
    min_interval: Duration,
    above_threshold: bool,
    last_fire: Option<Duration>,
}

impl FallingEdgeDetector {
    /// Create a new detector
    ///
    /// # Arguments
    /// * `threshold` - Level the signal must rise above and fall back below
    /// * `min_interval` - Minimum time between two firings
    pub fn new(threshold: f64, min_interval: Duration) -> Self {
        Self {
            threshold,
            min_interval,
            above_threshold: false,
            last_fire: None,
        }
    }

    /// Feed the next sample
    ///
    /// Returns `true` when a debounced falling edge is detected.
    ///
    /// # Arguments
    /// * `value` - Signal level
    /// * `timestamp` - Monotonic sample time
    pub fn detect(&mut self, value: f64, timestamp: Duration) -> bool {
        if !self.above_threshold {
            if value > self.threshold {
                self.above_threshold = true;
            }
            return false;
        }

        if value >= self.threshold {
            return false;
        }

        self.above_threshold = false;

        let debounced = self
            .last_fire
            .is_none_or(|last| timestamp.saturating_sub(last) >= self.min_interval);
        if debounced {
            self.last_fire = Some(timestamp);
        }
        debounced
    }

    pub fn is_latched(&self) -> bool {
        self.above_threshold
    }

    /// Clear the latch and the debounce history
    pub fn reset(&mut self) {
        self.above_threshold = false;
        self.last_fire = None;
    }
}
