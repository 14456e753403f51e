use super::Formatter;
use crate::navigation::{NavEvent, TurnGuidance};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format_event(&self, event: &NavEvent) -> String {
        match event {
            NavEvent::RouteStarted {
                start,
                destination,
                waypoints,
                distance,
                estimated_secs,
            } => format!(
                "Route: {} -> {} ({} waypoints, {:.1} m, ~{} s)",
                start.name, destination.name, waypoints, distance, estimated_secs
            ),
            NavEvent::RouteNotFound { start, end, reason } => {
                format!("No route from {} to {}: {}", start, end, reason)
            }
            NavEvent::StepCounted { total_steps } => format!("Steps: {}", total_steps),
            NavEvent::WaypointReached {
                index,
                node,
                total_steps,
                remaining_distance,
            } => {
                if self.verbose {
                    format!(
                        "Waypoint {:>2}: {} [{}] at {} steps, {:.1} m remaining",
                        index, node.name, node.id, total_steps, remaining_distance
                    )
                } else {
                    format!("Waypoint {:>2}: {}", index, node.name)
                }
            }
            NavEvent::Arrived { node, total_steps } => {
                format!("Arrived at {} after {} steps", node.name, total_steps)
            }
            NavEvent::Cancelled { at_index } => {
                format!("Navigation cancelled at waypoint {}", at_index)
            }
            NavEvent::SensorFault { kind, message } => {
                format!("Sensor fault ({:?}): {}", kind, message)
            }
        }
    }

    fn format_guidance(&self, guidance: &TurnGuidance) -> String {
        if self.verbose {
            format!(
                "{:<12} bearing: {:>5.1}° turn: {:>+6.1}° segment: {:.1} m",
                guidance.direction.to_string(),
                guidance.path_bearing,
                guidance.relative_angle,
                guidance.segment_distance
            )
        } else {
            guidance.direction.to_string()
        }
    }
}
