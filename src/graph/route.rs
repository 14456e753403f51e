use std::time::Duration;

use serde::Serialize;

use super::Node;

/// Ordered walk from the start node to the destination, inclusive
///
/// Always holds at least one node: a route from a node to itself is that
/// single node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    nodes: Vec<Node>,
    nodes_expanded: usize,
}

impl Route {
    pub(crate) fn new(nodes: Vec<Node>, nodes_expanded: usize) -> Self {
        debug_assert!(!nodes.is_empty());
        Self {
            nodes,
            nodes_expanded,
        }
    }

    /// Build a route from an explicit node list; `None` if the list is empty
    pub fn from_nodes(nodes: Vec<Node>) -> Option<Self> {
        if nodes.is_empty() {
            None
        } else {
            Some(Self::new(nodes, 0))
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn start(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn destination(&self) -> &Node {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn last_index(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Frontier pops the search needed to find this route
    pub fn nodes_expanded(&self) -> usize {
        self.nodes_expanded
    }

    /// Length of the segment leaving node `index`
    pub fn segment_length(&self, index: usize) -> Option<f64> {
        let from = self.nodes.get(index)?;
        let to = self.nodes.get(index + 1)?;
        Some(from.distance_to(to))
    }

    pub fn segment_lengths(&self) -> impl Iterator<Item = f64> + '_ {
        self.nodes.windows(2).map(|w| w[0].distance_to(&w[1]))
    }

    /// Sum of 3-D segment lengths
    pub fn total_distance(&self) -> f64 {
        self.segment_lengths().sum()
    }

    /// Distance still to walk from node `index` to the destination
    pub fn distance_from(&self, index: usize) -> f64 {
        self.segment_lengths().skip(index).sum()
    }

    /// Walking time for the whole route, rounded up to whole seconds
    pub fn estimated_time(&self, walking_speed_mps: f64) -> Duration {
        estimate_walking_time(self.total_distance(), walking_speed_mps)
    }

    /// `"Room 101 → Room 102 → Restroom"`
    pub fn summary(&self) -> String {
        self.nodes
            .iter()
            .map(|n| n.name.as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

/// Seconds needed to walk `distance`, rounded up
pub fn estimate_walking_time(distance: f64, walking_speed_mps: f64) -> Duration {
    if !(walking_speed_mps > 0.0) || !distance.is_finite() {
        return Duration::ZERO;
    }
    Duration::from_secs((distance / walking_speed_mps).ceil().max(0.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn corridor() -> Route {
        Route::from_nodes(vec![
            Node::new("a", "Alpha", 0.0, 0.0, 0.0),
            Node::new("b", "Bravo", 3.0, 4.0, 0.0),
            Node::new("c", "Charlie", 3.0, 4.0, 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_distances() {
        let route = corridor();
        assert_relative_eq!(route.segment_length(0).unwrap(), 5.0);
        assert_relative_eq!(route.segment_length(1).unwrap(), 2.0);
        assert!(route.segment_length(2).is_none());
        assert_relative_eq!(route.total_distance(), 7.0);
        assert_relative_eq!(route.distance_from(1), 2.0);
        assert_relative_eq!(route.distance_from(2), 0.0);
    }

    #[test]
    fn test_estimated_time_rounds_up() {
        let route = corridor();
        assert_eq!(route.estimated_time(1.0), Duration::from_secs(7));
        assert_eq!(route.estimated_time(2.0), Duration::from_secs(4));
        assert_eq!(route.estimated_time(0.0), Duration::ZERO);
    }

    #[test]
    fn test_summary_and_endpoints() {
        let route = corridor();
        assert_eq!(route.summary(), "Alpha → Bravo → Charlie");
        assert_eq!(route.start().id, "a");
        assert_eq!(route.destination().id, "c");
        assert_eq!(route.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_route_rejected() {
        assert!(Route::from_nodes(Vec::new()).is_none());
    }
}
