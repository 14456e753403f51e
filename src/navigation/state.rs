use serde::Serialize;

use super::progress::WaypointSchedule;
use crate::graph::{Node, Route};
use crate::sensors::SensorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationState {
    #[default]
    Idle,
    Routing,
    Navigating,
    Arrived,
    Cancelled,
}

impl NavigationState {
    /// True while a route is being computed or walked
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Routing | Self::Navigating)
    }
}

/// Progress along one route
#[derive(Debug, Clone)]
pub struct NavigationSession {
    route: Route,
    schedule: WaypointSchedule,
    current_index: usize,
    total_steps: u32,
}

impl NavigationSession {
    pub fn new(route: Route, schedule: WaypointSchedule) -> Self {
        Self {
            route,
            schedule,
            current_index: 0,
            total_steps: 0,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn schedule(&self) -> &WaypointSchedule {
        &self.schedule
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    pub fn current_node(&self) -> &Node {
        // current_index never exceeds last_index
        &self.route.nodes()[self.current_index]
    }

    pub fn next_node(&self) -> Option<&Node> {
        self.route.get(self.current_index + 1)
    }

    pub fn is_final_segment(&self) -> bool {
        self.current_index + 2 == self.route.len()
    }

    pub fn is_complete(&self) -> bool {
        self.current_index == self.route.last_index()
    }

    pub fn remaining_distance(&self) -> f64 {
        self.route.distance_from(self.current_index)
    }

    /// Record the running step total
    ///
    /// Returns the new index if this total moves the walker forward. The
    /// index never decreases and never passes the destination.
    pub fn record_step(&mut self, total_steps: u32) -> Option<usize> {
        self.total_steps = total_steps;
        let expected = self
            .schedule
            .expected_index(total_steps)
            .min(self.route.last_index());
        if expected > self.current_index {
            self.current_index = expected;
            Some(expected)
        } else {
            None
        }
    }
}

/// Node identity carried in events
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRef {
    pub id: String,
    pub name: String,
}

impl From<&Node> for NodeRef {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
        }
    }
}

/// Everything a navigator reports to its listeners
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavEvent {
    RouteStarted {
        start: NodeRef,
        destination: NodeRef,
        waypoints: usize,
        distance: f64,
        estimated_secs: u64,
    },
    RouteNotFound {
        start: String,
        end: String,
        reason: String,
    },
    StepCounted {
        total_steps: u32,
    },
    WaypointReached {
        index: usize,
        node: NodeRef,
        total_steps: u32,
        remaining_distance: f64,
    },
    Arrived {
        node: NodeRef,
        total_steps: u32,
    },
    Cancelled {
        at_index: usize,
    },
    SensorFault {
        kind: SensorKind,
        message: String,
    },
}

impl NavEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RouteStarted { .. } => "route_started",
            Self::RouteNotFound { .. } => "route_not_found",
            Self::StepCounted { .. } => "step_counted",
            Self::WaypointReached { .. } => "waypoint_reached",
            Self::Arrived { .. } => "arrived",
            Self::Cancelled { .. } => "cancelled",
            Self::SensorFault { .. } => "sensor_fault",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(len: usize) -> NavigationSession {
        let nodes = (0..len)
            .map(|i| Node::new(format!("n{i}"), format!("Node {i}"), i as f64 * 2.0, 0.0, 0.0))
            .collect();
        NavigationSession::new(Route::from_nodes(nodes).unwrap(), WaypointSchedule::fixed(8))
    }

    #[test]
    fn test_record_step_advances_on_schedule() {
        let mut s = session(5);
        assert_eq!(s.record_step(7), None);
        assert_eq!(s.record_step(8), Some(1));
        assert_eq!(s.record_step(9), None);
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.total_steps(), 9);
    }

    #[test]
    fn test_record_step_clamps_and_skips() {
        let mut s = session(5);
        // Burst skips straight past two waypoints
        assert_eq!(s.record_step(24), Some(3));
        assert_eq!(s.record_step(200), Some(4));
        assert!(s.is_complete());
        assert_eq!(s.record_step(400), None);
        assert_eq!(s.current_index(), 4);
    }

    #[test]
    fn test_record_step_never_decreases() {
        let mut s = session(5);
        s.record_step(16);
        assert_eq!(s.record_step(3), None);
        assert_eq!(s.current_index(), 2);
    }

    #[test]
    fn test_segment_queries() {
        let mut s = session(3);
        assert_eq!(s.next_node().unwrap().id, "n1");
        assert!(!s.is_final_segment());
        assert_eq!(s.remaining_distance(), 4.0);

        s.record_step(8);
        assert!(s.is_final_segment());
        assert_eq!(s.current_node().id, "n1");

        s.record_step(16);
        assert!(s.next_node().is_none());
        assert_eq!(s.remaining_distance(), 0.0);
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = NavEvent::StepCounted { total_steps: 3 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "step_counted");
        assert_eq!(json["total_steps"], 3);
        assert_eq!(event.name(), "step_counted");
    }
}
