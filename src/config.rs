//! Configuration for the Wayfinder navigation engine.
//!
//! Every section has a `Default` built from [`crate::constants`], and every
//! field is optional when loading from TOML, so a file only needs to mention
//! what it changes:
//!
//! ```toml
//! [steps]
//! threshold_g = 1.08
//!
//! [progress]
//! mode = "stride_length"
//! stride_length = 0.65
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{NavError, Result};

/// Average stride length
///
/// Parsed from a plain number of meters or with a unit suffix.
///
/// # Parsing formats
/// - `0.7` - meters (no suffix)
/// - `0.7m` - meters (explicit)
/// - `70cm` - centimeters
///
/// # Example
/// ```
/// use wayfinder::config::StrideLength;
///
/// let stride: StrideLength = "70cm".parse().unwrap();
/// assert!((stride.as_meters() - 0.7).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrideLength(f64);

impl StrideLength {
    pub fn from_meters(meters: f64) -> Self {
        Self(meters)
    }

    pub fn as_meters(&self) -> f64 {
        self.0
    }
}

impl Default for StrideLength {
    fn default() -> Self {
        Self(DEFAULT_STRIDE_LENGTH_M)
    }
}

impl fmt::Display for StrideLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}m", self.0)
    }
}

impl FromStr for StrideLength {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        let (num, scale) = if let Some(num) = s.strip_suffix("cm") {
            (num, 0.01)
        } else if let Some(num) = s.strip_suffix('m') {
            (num, 1.0)
        } else {
            (s, 1.0)
        };

        let value: f64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid stride length: {}", s))?;
        if !(value > 0.0) {
            return Err("stride length must be positive".to_string());
        }
        Ok(Self(value * scale))
    }
}

/// How step counts map onto waypoint progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceMode {
    /// Advance one waypoint every `steps_per_waypoint` steps
    FixedSteps,
    /// Each segment needs `ceil(segment length / stride length)` steps
    StrideLength,
}

/// System-wide navigation configuration
///
/// Use `NavConfig::default()` for the tuned defaults.
///
/// # Example
/// ```
/// use wayfinder::config::NavConfig;
///
/// let mut config = NavConfig::default();
/// config.progress.steps_per_waypoint = 10;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Route search configuration
    pub route: RouteConfig,
    /// Step detection configuration
    pub steps: StepConfig,
    /// Heading smoothing configuration
    pub heading: HeadingConfig,
    /// Waypoint progress configuration
    pub progress: ProgressConfig,
    /// Turn guidance configuration
    pub guidance: GuidanceConfig,
    /// Spoken announcement configuration
    pub announcements: AnnouncementConfig,
}

impl NavConfig {
    /// Parse a (possibly partial) TOML configuration
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: NavConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject values that would stall or break the pipeline
    pub fn validate(&self) -> Result<()> {
        if self.route.expansion_budget == 0 {
            return Err(NavError::Config(
                "route.expansion_budget must be at least 1".to_string(),
            ));
        }
        if !(self.route.walking_speed_mps > 0.0) {
            return Err(NavError::Config(
                "route.walking_speed_mps must be positive".to_string(),
            ));
        }
        if !(self.heading.alpha > 0.0 && self.heading.alpha <= 1.0) {
            return Err(NavError::Config(format!(
                "heading.alpha must be in (0, 1], got {}",
                self.heading.alpha
            )));
        }
        if self.progress.steps_per_waypoint == 0 {
            return Err(NavError::Config(
                "progress.steps_per_waypoint must be at least 1".to_string(),
            ));
        }
        if !(self.progress.stride_length.as_meters() > 0.0) {
            return Err(NavError::Config(
                "progress.stride_length must be positive".to_string(),
            ));
        }
        if !(self.steps.measurement_noise > 0.0) {
            return Err(NavError::Config(
                "steps.measurement_noise must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Route search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Maximum frontier pops before the search reports truncation
    pub expansion_budget: usize,
    /// Walking speed for arrival time estimates (m/s)
    pub walking_speed_mps: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            expansion_budget: DEFAULT_EXPANSION_BUDGET,
            walking_speed_mps: WALKING_SPEED_MPS,
        }
    }
}

/// Step detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    /// Filtered magnitude (in g) that latches a footfall
    pub threshold_g: f64,
    /// Minimum time between counted steps in milliseconds
    pub min_step_interval_ms: u64,
    /// Magnitude filter process noise
    pub process_noise: f64,
    /// Magnitude filter measurement noise
    pub measurement_noise: f64,
    /// Accelerometer sampling period requested from the sensor source
    pub sample_period_ms: u64,
}

impl StepConfig {
    pub fn min_step_interval(&self) -> Duration {
        Duration::from_millis(self.min_step_interval_ms)
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms)
    }
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            threshold_g: STEP_THRESHOLD_G,
            min_step_interval_ms: MIN_STEP_INTERVAL_MS,
            process_noise: STEP_FILTER_PROCESS_NOISE,
            measurement_noise: STEP_FILTER_MEASUREMENT_NOISE,
            sample_period_ms: ACCEL_SAMPLE_PERIOD_MS,
        }
    }
}

/// Heading smoothing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    /// Exponential smoothing factor (higher = faster, noisier)
    pub alpha: f64,
    /// Magnetometer sampling period requested from the sensor source
    pub sample_period_ms: u64,
}

impl HeadingConfig {
    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms)
    }
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            alpha: HEADING_SMOOTHING_ALPHA,
            sample_period_ms: MAG_SAMPLE_PERIOD_MS,
        }
    }
}

/// Waypoint progress configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub mode: AdvanceMode,
    /// Used by [`AdvanceMode::FixedSteps`]
    pub steps_per_waypoint: u32,
    /// Used by [`AdvanceMode::StrideLength`]
    pub stride_length: StrideLength,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            mode: AdvanceMode::FixedSteps,
            steps_per_waypoint: STEPS_PER_WAYPOINT,
            stride_length: StrideLength::default(),
        }
    }
}

/// Turn guidance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// Relative angle (degrees) inside which guidance says "straight"
    pub turn_threshold_deg: f64,
    /// Final-segment distance under which guidance says "arriving"
    pub arriving_distance: f64,
    /// Time after the last step during which the user counts as moving
    pub movement_timeout_ms: u64,
}

impl GuidanceConfig {
    pub fn movement_timeout(&self) -> Duration {
        Duration::from_millis(self.movement_timeout_ms)
    }
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            turn_threshold_deg: TURN_THRESHOLD_DEG,
            arriving_distance: ARRIVING_DISTANCE,
            movement_timeout_ms: MOVEMENT_TIMEOUT_MS,
        }
    }
}

/// Spoken announcement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncementConfig {
    pub enabled: bool,
}

impl Default for AnnouncementConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_length_from_meters() {
        let stride: StrideLength = "0.65".parse().unwrap();
        assert!((stride.as_meters() - 0.65).abs() < 1e-9);

        let stride: StrideLength = "0.65m".parse().unwrap();
        assert!((stride.as_meters() - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_stride_length_from_centimeters() {
        let stride: StrideLength = "72cm".parse().unwrap();
        assert!((stride.as_meters() - 0.72).abs() < 1e-9);
    }

    #[test]
    fn test_stride_length_invalid() {
        assert!("abc".parse::<StrideLength>().is_err());
        assert!("-1m".parse::<StrideLength>().is_err());
        assert!("0cm".parse::<StrideLength>().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = NavConfig::from_toml_str(
            r#"
            [steps]
            threshold_g = 1.1

            [progress]
            mode = "stride_length"
            stride_length = 0.8
            "#,
        )
        .unwrap();

        assert!((config.steps.threshold_g - 1.1).abs() < 1e-9);
        assert_eq!(config.steps.min_step_interval_ms, MIN_STEP_INTERVAL_MS);
        assert_eq!(config.progress.mode, AdvanceMode::StrideLength);
        assert!((config.progress.stride_length.as_meters() - 0.8).abs() < 1e-9);
        assert_eq!(config.route.expansion_budget, DEFAULT_EXPANSION_BUDGET);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = NavConfig::from_toml_str("[route]\nexpansion_budget = 0\n");
        assert!(matches!(err, Err(NavError::Config(_))));

        let err = NavConfig::from_toml_str("[heading]\nalpha = 1.5\n");
        assert!(matches!(err, Err(NavError::Config(_))));

        let err = NavConfig::from_toml_str("[route]\nexpansion_budget = \"lots\"\n");
        assert!(matches!(err, Err(NavError::ConfigFormat(_))));
    }
}
