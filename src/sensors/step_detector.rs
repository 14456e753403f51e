use std::time::Duration;

use serde::Serialize;

use super::AccelSample;
use crate::config::StepConfig;
use crate::events::{Observers, Subscription};
use crate::signal_processing::{FallingEdgeDetector, ScalarKalman};

/// A counted step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepEvent {
    /// Running total since the detector was started or reset
    pub count: u32,
    /// Timestamp of the sample that completed the step
    pub timestamp: Duration,
}

/// Pedometer driven by accelerometer magnitude
///
/// The magnitude of each sample is smoothed with a scalar Kalman filter and
/// run through a falling-edge latch around a threshold just above resting
/// gravity. A step counts when the filtered magnitude drops back below the
/// threshold, provided the minimum step interval has passed since the last
/// counted step.
///
/// Samples are ignored until [`start`](Self::start) is called.
pub struct StepDetector {
    filter: ScalarKalman,
    edge: FallingEdgeDetector,
    step_count: u32,
    running: bool,
    listeners: Observers<StepEvent>,
}

impl StepDetector {
    pub fn new(config: &StepConfig) -> Self {
        Self {
            filter: ScalarKalman::new(config.process_noise, config.measurement_noise),
            edge: FallingEdgeDetector::new(config.threshold_g, config.min_step_interval()),
            step_count: 0,
            running: false,
            listeners: Observers::new(),
        }
    }

    /// Begin accepting samples with a fresh count and filter
    ///
    /// Returns `false` (and changes nothing) if already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.clear();
        self.running = true;
        log::debug!("Step detector started");
        true
    }

    /// Stop accepting samples; the count is kept
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Step detector stopped at {} steps", self.step_count);
        }
        self.running = false;
    }

    /// Zero the count and filter without changing the running state
    pub fn reset(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.step_count = 0;
        self.filter.reset();
        self.edge.reset();
    }

    /// Process one accelerometer sample
    ///
    /// Returns the step event when this sample completes a step. Listeners
    /// are notified for every counted step, not for every sample.
    pub fn process_sample(&mut self, sample: &AccelSample) -> Option<StepEvent> {
        if !self.running {
            return None;
        }

        let raw = sample.magnitude();
        if !raw.is_finite() {
            log::trace!("Skipping non-finite sample at {:?}", sample.timestamp);
            return None;
        }
        let magnitude = self.filter.filter(raw);

        if !self.edge.detect(magnitude, sample.timestamp) {
            return None;
        }

        self.step_count += 1;
        let event = StepEvent {
            count: self.step_count,
            timestamp: sample.timestamp,
        };
        log::trace!("Step {} at {:?}", event.count, event.timestamp);
        self.listeners.notify(&event);
        Some(event)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&StepEvent) + Send + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, token: Subscription) -> bool {
        self.listeners.unsubscribe(token)
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl std::fmt::Debug for StepDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepDetector")
            .field("step_count", &self.step_count)
            .field("running", &self.running)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
