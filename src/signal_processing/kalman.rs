/// One-dimensional Kalman filter for smoothing noisy scalar sensor readings
///
/// Models the signal as `x[k] = A·x[k-1] + B·u[k]` observed through
/// `z[k] = C·x[k]`. With the defaults (`A = 1`, `B = 0`, `C = 1`) it is a plain
/// scalar tracker whose responsiveness is set by the ratio of process noise
/// `R` to measurement noise `Q`: a small `R` relative to `Q` gives a smooth,
/// slower estimate.
///
/// The filter is uninitialized until the first measurement, which is taken
/// as the initial estimate verbatim.
#[derive(Debug, Clone)]
pub struct ScalarKalman {
    process_noise: f64,
    measurement_noise: f64,
    state_transition: f64,
    control_gain: f64,
    measurement_scale: f64,
    state: Option<FilterState>,
}

/// Current estimate and its covariance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterState {
    pub estimate: f64,
    pub covariance: f64,
}

impl ScalarKalman {
    /// Create a scalar tracker
    ///
    /// # Arguments
    /// * `process_noise` - R, how fast the true value is expected to wander
    /// * `measurement_noise` - Q, how noisy each reading is
    pub fn new(process_noise: f64, measurement_noise: f64) -> Self {
        Self::with_model(process_noise, measurement_noise, 1.0, 0.0, 1.0)
    }

    /// Create a filter with an explicit state model
    ///
    /// # Arguments
    /// * `state_transition` - A
    /// * `control_gain` - B
    /// * `measurement_scale` - C, must be non-zero
    pub fn with_model(
        process_noise: f64,
        measurement_noise: f64,
        state_transition: f64,
        control_gain: f64,
        measurement_scale: f64,
    ) -> Self {
        Self {
            process_noise,
            measurement_noise,
            state_transition,
            control_gain,
            measurement_scale,
            state: None,
        }
    }

    /// Filter a measurement with no control input
    pub fn filter(&mut self, measurement: f64) -> f64 {
        self.filter_with_control(measurement, 0.0)
    }

    /// Filter a measurement, returning the updated estimate
    pub fn filter_with_control(&mut self, measurement: f64, control: f64) -> f64 {
        let a = self.state_transition;
        let c = self.measurement_scale;

        let next = match self.state {
            None => FilterState {
                estimate: measurement / c,
                covariance: self.measurement_noise / (c * c),
            },
            Some(prev) => {
                // Predict
                let predicted = a * prev.estimate + self.control_gain * control;
                let predicted_cov = a * prev.covariance * a + self.process_noise;

                // Correct
                let gain = predicted_cov * c / (c * predicted_cov * c + self.measurement_noise);
                FilterState {
                    estimate: predicted + gain * (measurement - c * predicted),
                    covariance: predicted_cov - gain * c * predicted_cov,
                }
            }
        };

        self.state = Some(next);
        next.estimate
    }

    /// Last estimate, `None` before the first measurement
    pub fn estimate(&self) -> Option<f64> {
        self.state.map(|s| s.estimate)
    }

    pub fn state(&self) -> Option<FilterState> {
        self.state
    }

    /// Forget the current estimate; the next measurement re-initializes
    pub fn reset(&mut self) {
        self.state = None;
    }
}

impl Default for ScalarKalman {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}
