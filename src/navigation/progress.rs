use crate::config::{AdvanceMode, ProgressConfig};
use crate::constants::DISTANCE_EPSILON;
use crate::graph::Route;

/// Maps the running step total to the waypoint the walker should be at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaypointSchedule {
    /// One waypoint every `steps_per_waypoint` steps, regardless of distance
    FixedSteps { steps_per_waypoint: u32 },
    /// `thresholds[i]` is the step total at which node `i` is reached
    Cumulative { thresholds: Vec<u32> },
}

impl WaypointSchedule {
    pub fn for_route(route: &Route, config: &ProgressConfig) -> Self {
        match config.mode {
            AdvanceMode::FixedSteps => Self::fixed(config.steps_per_waypoint),
            AdvanceMode::StrideLength => {
                Self::from_stride(route, config.stride_length.as_meters())
            }
        }
    }

    pub fn fixed(steps_per_waypoint: u32) -> Self {
        Self::FixedSteps {
            steps_per_waypoint: steps_per_waypoint.max(1),
        }
    }

    /// Each segment needs `ceil(length / stride)` steps, at least one
    pub fn from_stride(route: &Route, stride_m: f64) -> Self {
        let stride = stride_m.max(DISTANCE_EPSILON);
        let mut thresholds = Vec::with_capacity(route.len());
        let mut total = 0u32;
        thresholds.push(total);
        for length in route.segment_lengths() {
            let steps = (length / stride).ceil();
            let steps = if steps.is_finite() {
                (steps as u32).max(1)
            } else {
                1
            };
            total = total.saturating_add(steps);
            thresholds.push(total);
        }
        Self::Cumulative { thresholds }
    }

    /// Waypoint index implied by `total_steps`
    ///
    /// For the fixed schedule this is unbounded; callers clamp to the route.
    pub fn expected_index(&self, total_steps: u32) -> usize {
        match self {
            Self::FixedSteps { steps_per_waypoint } => {
                (total_steps / steps_per_waypoint) as usize
            }
            Self::Cumulative { thresholds } => thresholds
                .partition_point(|&t| t <= total_steps)
                .saturating_sub(1),
        }
    }

    /// Step total at which waypoint `index` is reached
    pub fn steps_to_reach(&self, index: usize) -> Option<u32> {
        match self {
            Self::FixedSteps { steps_per_waypoint } => {
                u32::try_from(index).ok()?.checked_mul(*steps_per_waypoint)
            }
            Self::Cumulative { thresholds } => thresholds.get(index).copied(),
        }
    }
}
