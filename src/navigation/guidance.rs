use std::fmt;

use serde::Serialize;

use crate::config::GuidanceConfig;
use crate::graph::Node;
use crate::signal_processing::{angle_difference, compass_bearing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    Straight,
    Left,
    Right,
    /// Facing the destination on the last, short segment
    Arriving,
}

impl fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Straight => "Go Straight",
            Self::Left => "Turn Left",
            Self::Right => "Turn Right",
            Self::Arriving => "Arriving",
        };
        f.write_str(label)
    }
}

/// Turn instruction toward the next waypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TurnGuidance {
    pub direction: TurnDirection,
    /// Signed turn in `(-180, 180]`; positive is clockwise (right)
    pub relative_angle: f64,
    /// Compass bearing of the segment
    pub path_bearing: f64,
    /// Floor-plan length of the segment
    pub segment_distance: f64,
}

/// Classify the turn needed to walk from `current` toward `next`
///
/// `final_segment` is true when `next` is the destination; a short final
/// segment that the walker already faces is reported as
/// [`TurnDirection::Arriving`].
pub fn classify_turn(
    current: &Node,
    next: &Node,
    heading: f64,
    final_segment: bool,
    config: &GuidanceConfig,
) -> TurnGuidance {
    let dx = next.x - current.x;
    let dy = next.y - current.y;

    let path_bearing = compass_bearing(dx, dy);
    let relative_angle = angle_difference(path_bearing, heading);
    let segment_distance = current.planar_distance_to(next);

    let threshold = config.turn_threshold_deg;
    let facing = relative_angle.abs() <= threshold;

    let direction = if facing && final_segment && segment_distance < config.arriving_distance {
        TurnDirection::Arriving
    } else if facing {
        TurnDirection::Straight
    } else if relative_angle > 0.0 {
        TurnDirection::Right
    } else {
        TurnDirection::Left
    };

    TurnGuidance {
        direction,
        relative_angle,
        path_bearing,
        segment_distance,
    }
}
