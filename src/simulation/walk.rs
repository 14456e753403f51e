use std::f64::consts::PI;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::config::NavConfig;
use crate::error::{NavError, Result};
use crate::graph::Route;
use crate::navigation::WaypointSchedule;
use crate::sensors::{AccelSample, MagSample, SensorEvent, SensorKind};
use crate::signal_processing::compass_bearing;

/// Parameters for a synthetic walk
#[derive(Clone, Debug)]
pub struct WalkConfig {
    pub seed: Option<u64>,
    /// Steps per second
    pub cadence_hz: f64,
    /// Peak vertical acceleration above 1 g per stride, in g
    pub step_amplitude_g: f64,
    /// Gaussian noise on each accelerometer axis, in g
    pub accel_noise_g: f64,
    /// Gaussian noise on the heading, in degrees
    pub heading_noise_deg: f64,
    /// Standing still after the last step
    pub dwell_ms: u64,
    pub accel_period_ms: u64,
    pub mag_period_ms: u64,
    /// Inject a magnetometer stream failure at this time
    pub magnetometer_failure_ms: Option<u64>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            seed: None,
            cadence_hz: 1.8,
            step_amplitude_g: 0.35,
            accel_noise_g: 0.02,
            heading_noise_deg: 2.0,
            dwell_ms: 1000,
            accel_period_ms: 30,
            mag_period_ms: 100,
            magnetometer_failure_ms: None,
        }
    }
}

impl WalkConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn noiseless(mut self) -> Self {
        self.accel_noise_g = 0.0;
        self.heading_noise_deg = 0.0;
        self
    }

    /// Use the sample periods a navigator is configured for
    pub fn with_sample_periods(mut self, config: &NavConfig) -> Self {
        self.accel_period_ms = config.steps.sample_period_ms;
        self.mag_period_ms = config.heading.sample_period_ms;
        self
    }
}

/// Sensor streams for walking a route from start to finish
#[derive(Clone, Debug)]
pub struct SimulatedWalk {
    pub accelerometer: Vec<SensorEvent>,
    pub magnetometer: Vec<SensorEvent>,
    /// Strides taken
    pub steps: u32,
    pub duration: Duration,
}

impl SimulatedWalk {
    /// Both streams interleaved by timestamp
    ///
    /// A stream error takes the time of the sample before it.
    pub fn merged(&self) -> Vec<SensorEvent> {
        let mut events: Vec<(Duration, usize, SensorEvent)> = Vec::new();
        for stream in [&self.accelerometer, &self.magnetometer] {
            let mut last = Duration::ZERO;
            for event in stream {
                last = event.timestamp().unwrap_or(last);
                events.push((last, events.len(), event.clone()));
            }
        }
        events.sort_by_key(|(t, i, _)| (*t, *i));
        events.into_iter().map(|(_, _, e)| e).collect()
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

fn normal(std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, std_dev).map_err(|e| NavError::Config(format!("noise level {std_dev}: {e}")))
}

/// Generate accelerometer and magnetometer streams for walking `route`
///
/// The walker takes exactly as many strides as `schedule` needs to reach the
/// destination, one stride per cycle of a vertical sinusoid at
/// `cadence_hz`, and faces along whichever segment the schedule says they are
/// on. Magnetometer samples encode that facing as the horizontal field
/// vector, so `atan2(y, x)` gives back the heading.
pub fn simulate_walk(
    route: &Route,
    schedule: &WaypointSchedule,
    config: &WalkConfig,
) -> Result<SimulatedWalk> {
    if !(config.cadence_hz > 0.0) || config.accel_period_ms == 0 || config.mag_period_ms == 0 {
        return Err(NavError::Config(
            "walk cadence and sample periods must be positive".to_string(),
        ));
    }

    let mut rng = create_rng(config.seed);
    let accel_noise = normal(config.accel_noise_g)?;
    let heading_noise = normal(config.heading_noise_deg)?;

    let steps = schedule.steps_to_reach(route.last_index()).unwrap_or(0);
    let walking = Duration::from_secs_f64(steps as f64 / config.cadence_hz);
    let duration = walking + Duration::from_millis(config.dwell_ms);

    let bearings: Vec<f64> = route
        .nodes()
        .windows(2)
        .map(|w| compass_bearing(w[1].x - w[0].x, w[1].y - w[0].y))
        .collect();
    let facing = |t: Duration| -> f64 {
        if bearings.is_empty() {
            return 0.0;
        }
        let stride = (t.as_secs_f64() * config.cadence_hz) as u32;
        let segment = schedule
            .expected_index(stride.min(steps))
            .min(bearings.len() - 1);
        bearings[segment]
    };

    let accel_period = Duration::from_millis(config.accel_period_ms);
    let mut accelerometer = Vec::new();
    let mut t = Duration::ZERO;
    while t <= duration {
        let vertical = if t < walking {
            config.step_amplitude_g * (2.0 * PI * config.cadence_hz * t.as_secs_f64()).sin()
        } else {
            0.0
        };
        let sample = AccelSample::new(
            accel_noise.sample(&mut rng),
            accel_noise.sample(&mut rng),
            1.0 + vertical + accel_noise.sample(&mut rng),
            t,
        );
        accelerometer.push(SensorEvent::Accelerometer(sample));
        t += accel_period;
    }

    let mag_period = Duration::from_millis(config.mag_period_ms);
    let failure = config.magnetometer_failure_ms.map(Duration::from_millis);
    let mut magnetometer = Vec::new();
    let mut t = Duration::ZERO;
    while t <= duration {
        if failure.is_some_and(|f| t >= f) {
            magnetometer.push(SensorEvent::StreamError {
                kind: SensorKind::Magnetometer,
                message: "simulated magnetometer dropout".to_string(),
            });
            break;
        }
        let heading = (facing(t) + heading_noise.sample(&mut rng)).to_radians();
        magnetometer.push(SensorEvent::Magnetometer(MagSample::new(
            heading.cos(),
            heading.sin(),
            t,
        )));
        t += mag_period;
    }

    log::debug!(
        "Simulated {} steps over {:?}: {} accel, {} mag samples",
        steps,
        duration,
        accelerometer.len(),
        magnetometer.len()
    );

    Ok(SimulatedWalk {
        accelerometer,
        magnetometer,
        steps,
        duration,
    })
}
