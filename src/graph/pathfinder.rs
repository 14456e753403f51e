//! A* shortest-path search over the building graph.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use log::{debug, trace, warn};

use super::{Graph, Node, Route};
use crate::config::RouteConfig;
use crate::constants::DEFAULT_EXPANSION_BUDGET;
use crate::error::PathError;

/// Frontier entry, ordered so the heap pops the lowest `f` first and breaks
/// ties on the lowest node id
#[derive(Debug, Clone, Copy)]
struct OpenEntry<'g> {
    f_cost: f64,
    id: &'g str,
}

impl Eq for OpenEntry<'_> {}

impl PartialEq for OpenEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for OpenEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.id.cmp(self.id))
    }
}

impl PartialOrd for OpenEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* route planner
///
/// Cost is cumulative 3-D corridor length and the heuristic is the straight
/// line to the destination, which never overestimates, so the first time the
/// destination leaves the frontier its route is the shortest.
///
/// The search gives up after `expansion_budget` frontier pops and reports
/// [`PathError::SearchTruncated`], which is distinct from
/// [`PathError::Unreachable`].
#[derive(Debug, Clone)]
pub struct Pathfinder {
    expansion_budget: usize,
}

impl Pathfinder {
    pub fn new(config: &RouteConfig) -> Self {
        Self::with_budget(config.expansion_budget)
    }

    pub fn with_budget(expansion_budget: usize) -> Self {
        Self { expansion_budget }
    }

    pub fn expansion_budget(&self) -> usize {
        self.expansion_budget
    }

    /// Find the shortest route from `start` to `end`
    ///
    /// Edges that reference unknown nodes are skipped.
    pub fn find_path(&self, graph: &Graph, start: &str, end: &str) -> Result<Route, PathError> {
        trace!("[AStar] find_path: start={} end={}", start, end);

        let nodes = graph.node_index();
        let start_node = *nodes
            .get(start)
            .ok_or_else(|| PathError::InvalidEndpoint(start.to_string()))?;
        let goal_node = *nodes
            .get(end)
            .ok_or_else(|| PathError::InvalidEndpoint(end.to_string()))?;

        if start == end {
            return Ok(Route::new(vec![start_node.clone()], 0));
        }

        let adjacency = build_adjacency(graph, &nodes);
        let goal_id = goal_node.id.as_str();

        let mut open_set = BinaryHeap::new();
        let mut closed_set: HashSet<&str> = HashSet::new();
        let mut came_from: HashMap<&str, &str> = HashMap::new();
        let mut g_scores: HashMap<&str, f64> = HashMap::new();

        g_scores.insert(start_node.id.as_str(), 0.0);
        open_set.push(OpenEntry {
            f_cost: start_node.distance_to(goal_node),
            id: start_node.id.as_str(),
        });

        let mut nodes_expanded = 0;

        while let Some(OpenEntry { id: current, .. }) = open_set.pop() {
            if closed_set.contains(current) {
                continue;
            }

            if nodes_expanded >= self.expansion_budget {
                debug!(
                    "[AStar] FAILED: expansion budget of {} exhausted",
                    self.expansion_budget
                );
                return Err(PathError::SearchTruncated {
                    expanded: nodes_expanded,
                });
            }
            nodes_expanded += 1;

            if current == goal_id {
                let path = reconstruct_path(&came_from, &nodes, goal_id);
                debug!(
                    "[AStar] found {} node route after expanding {} nodes",
                    path.len(),
                    nodes_expanded
                );
                return Ok(Route::new(path, nodes_expanded));
            }
            closed_set.insert(current);

            let (Some(current_node), Some(&current_g)) = (nodes.get(current), g_scores.get(current))
            else {
                continue;
            };

            for &neighbor in adjacency.get(current).map(Vec::as_slice).unwrap_or_default() {
                if closed_set.contains(neighbor) {
                    continue;
                }
                let Some(neighbor_node) = nodes.get(neighbor) else {
                    continue;
                };

                let tentative_g = current_g + current_node.distance_to(neighbor_node);
                let known_g = g_scores.get(neighbor).copied().unwrap_or(f64::INFINITY);
                if tentative_g < known_g {
                    came_from.insert(neighbor, current);
                    g_scores.insert(neighbor, tentative_g);
                    open_set.push(OpenEntry {
                        f_cost: tentative_g + neighbor_node.distance_to(goal_node),
                        id: neighbor,
                    });
                }
            }
        }

        debug!(
            "[AStar] FAILED: no route after expanding {} nodes",
            nodes_expanded
        );
        Err(PathError::Unreachable {
            start: start.to_string(),
            end: end.to_string(),
        })
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::with_budget(DEFAULT_EXPANSION_BUDGET)
    }
}

/// Shortest route with the default expansion budget
pub fn find_path(graph: &Graph, start: &str, end: &str) -> Result<Route, PathError> {
    Pathfinder::default().find_path(graph, start, end)
}

/// Undirected adjacency lists in edge order, skipping dangling edges
fn build_adjacency<'g>(
    graph: &'g Graph,
    nodes: &HashMap<&'g str, &'g Node>,
) -> HashMap<&'g str, Vec<&'g str>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::with_capacity(nodes.len());
    for edge in &graph.edges {
        let source = edge.source.as_str();
        let target = edge.target.as_str();
        if !nodes.contains_key(source) || !nodes.contains_key(target) {
            warn!(
                "Ignoring edge {:?}: {} -> {} references an unknown node",
                edge.id, source, target
            );
            continue;
        }
        adjacency.entry(source).or_default().push(target);
        adjacency.entry(target).or_default().push(source);
    }
    adjacency
}

fn reconstruct_path(
    came_from: &HashMap<&str, &str>,
    nodes: &HashMap<&str, &Node>,
    goal: &str,
) -> Vec<Node> {
    let mut ids = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(current) {
        ids.push(prev);
        current = prev;
    }

    ids.iter()
        .rev()
        .filter_map(|id| nodes.get(id).map(|n| (*n).clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};
    use approx::assert_relative_eq;

    fn chain(len: usize) -> Graph {
        let nodes = (0..len)
            .map(|i| Node::new(format!("n{:03}", i), format!("Node {}", i), i as f64, 0.0, 0.0))
            .collect();
        let edges = (1..len)
            .map(|i| Edge::new(format!("e{}", i), format!("n{:03}", i - 1), format!("n{:03}", i)))
            .collect();
        Graph::new(nodes, edges)
    }

    #[test]
    fn test_prefers_shorter_detour() {
        // a -> far -> d is fewer hops but longer than a -> b -> c -> d
        let graph = Graph::new(
            vec![
                Node::new("a", "A", 0.0, 0.0, 0.0),
                Node::new("b", "B", 1.0, 0.0, 0.0),
                Node::new("c", "C", 2.0, 0.0, 0.0),
                Node::new("d", "D", 3.0, 0.0, 0.0),
                Node::new("far", "Far", 1.5, 10.0, 0.0),
            ],
            vec![
                Edge::new("1", "a", "far"),
                Edge::new("2", "far", "d"),
                Edge::new("3", "a", "b"),
                Edge::new("4", "b", "c"),
                Edge::new("5", "c", "d"),
            ],
        );

        let route = find_path(&graph, "a", "d").unwrap();
        assert_eq!(route.ids(), vec!["a", "b", "c", "d"]);
        assert_relative_eq!(route.total_distance(), 3.0);
    }

    #[test]
    fn test_edges_are_undirected() {
        let graph = chain(4);
        let route = find_path(&graph, "n003", "n000").unwrap();
        assert_eq!(route.ids(), vec!["n003", "n002", "n001", "n000"]);
    }

    #[test]
    fn test_same_start_and_end() {
        let graph = chain(3);
        let route = find_path(&graph, "n001", "n001").unwrap();
        assert_eq!(route.ids(), vec!["n001"]);
        assert_relative_eq!(route.total_distance(), 0.0);
    }

    #[test]
    fn test_unknown_endpoints() {
        let graph = chain(3);
        assert_eq!(
            find_path(&graph, "nope", "n001"),
            Err(PathError::InvalidEndpoint("nope".to_string()))
        );
        assert_eq!(
            find_path(&graph, "n001", "nope"),
            Err(PathError::InvalidEndpoint("nope".to_string()))
        );
    }

    #[test]
    fn test_disconnected_is_unreachable() {
        let mut graph = chain(3);
        graph.nodes.push(Node::new("island", "Island", 50.0, 50.0, 0.0));
        assert_eq!(
            find_path(&graph, "n000", "island"),
            Err(PathError::Unreachable {
                start: "n000".to_string(),
                end: "island".to_string()
            })
        );
    }

    #[test]
    fn test_budget_truncation_is_distinct() {
        let graph = chain(5);

        let route = Pathfinder::with_budget(5)
            .find_path(&graph, "n000", "n004")
            .unwrap();
        assert_eq!(route.len(), 5);
        assert_eq!(route.nodes_expanded(), 5);

        assert_eq!(
            Pathfinder::with_budget(4).find_path(&graph, "n000", "n004"),
            Err(PathError::SearchTruncated { expanded: 4 })
        );
    }

    #[test]
    fn test_long_chain_reconstructs_fully() {
        let graph = chain(40);
        let route = find_path(&graph, "n000", "n039").unwrap();
        assert_eq!(route.len(), 40);
        assert_eq!(route.start().id, "n000");
        assert_eq!(route.destination().id, "n039");
        assert_relative_eq!(route.total_distance(), 39.0);
    }

    #[test]
    fn test_dangling_edges_ignored() {
        let mut graph = chain(3);
        graph.edges.push(Edge::new("ghost", "n000", "missing"));
        graph.edges.push(Edge::new("ghost2", "missing", "n002"));

        let route = find_path(&graph, "n000", "n002").unwrap();
        assert_eq!(route.ids(), vec!["n000", "n001", "n002"]);
    }

    #[test]
    fn test_equal_cost_ties_break_on_lowest_id() {
        // Two mirror-image routes of identical length
        let graph = Graph::new(
            vec![
                Node::new("start", "Start", 0.0, 0.0, 0.0),
                Node::new("upper", "Upper", 1.0, -1.0, 0.0),
                Node::new("lower", "Lower", 1.0, 1.0, 0.0),
                Node::new("zend", "End", 2.0, 0.0, 0.0),
            ],
            vec![
                Edge::new("1", "start", "upper"),
                Edge::new("2", "upper", "zend"),
                Edge::new("3", "start", "lower"),
                Edge::new("4", "lower", "zend"),
            ],
        );

        for _ in 0..10 {
            let route = find_path(&graph, "start", "zend").unwrap();
            assert_eq!(route.ids(), vec!["start", "lower", "zend"]);
        }
    }

    #[test]
    fn test_heap_orders_by_cost_then_id() {
        let mut heap = BinaryHeap::new();
        heap.push(OpenEntry { f_cost: 2.0, id: "a" });
        heap.push(OpenEntry { f_cost: 1.0, id: "z" });
        heap.push(OpenEntry { f_cost: 1.0, id: "m" });

        assert_eq!(heap.pop().unwrap().id, "m");
        assert_eq!(heap.pop().unwrap().id, "z");
        assert_eq!(heap.pop().unwrap().id, "a");
    }
}
