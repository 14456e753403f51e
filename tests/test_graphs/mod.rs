#![allow(dead_code)]

use std::collections::HashSet;

use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wayfinder::graph::{Edge, Graph, Node};

/// Scattered nodes on one floor with roughly `edge_probability` of all
/// pairs connected
pub fn random_graph(seed: u64, node_count: usize, edge_probability: f64) -> Graph {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let nodes: Vec<Node> = (0..node_count)
        .map(|i| {
            Node::new(
                format!("n{i}"),
                format!("Node {i}"),
                rng.random::<f64>() * 50.0,
                rng.random::<f64>() * 50.0,
                rng.random_range(0..3) as f64 * 4.0,
            )
        })
        .collect();

    let mut edges = Vec::new();
    for i in 0..node_count {
        for j in (i + 1)..node_count {
            if rng.random_bool(edge_probability) {
                edges.push(Edge::new(format!("e{i}_{j}"), format!("n{i}"), format!("n{j}")));
            }
        }
    }
    Graph::new(nodes, edges)
}

/// `width × height` grid, 4 m spacing, neighbours connected
pub fn grid_graph(width: usize, height: usize) -> Graph {
    let id = |x: usize, y: usize| format!("g{x}_{y}");
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for y in 0..height {
        for x in 0..width {
            nodes.push(Node::new(
                id(x, y),
                format!("Grid {x},{y}"),
                x as f64 * 4.0,
                y as f64 * 4.0,
                0.0,
            ));
            if x + 1 < width {
                edges.push(Edge::new(format!("h{x}_{y}"), id(x, y), id(x + 1, y)));
            }
            if y + 1 < height {
                edges.push(Edge::new(format!("v{x}_{y}"), id(x, y), id(x, y + 1)));
            }
        }
    }
    Graph::new(nodes, edges)
}

fn neighbours<'g>(graph: &'g Graph, id: &str) -> Vec<&'g str> {
    graph
        .edges
        .iter()
        .filter_map(|e| {
            if e.source == id {
                Some(e.target.as_str())
            } else if e.target == id {
                Some(e.source.as_str())
            } else {
                None
            }
        })
        .filter(|n| graph.contains(n))
        .collect()
}

/// Shortest distance over every simple path; only for small graphs
pub fn brute_force_distance(graph: &Graph, start: &str, end: &str) -> Option<f64> {
    fn walk(
        graph: &Graph,
        at: &str,
        end: &str,
        so_far: f64,
        visited: &mut HashSet<String>,
        best: &mut Option<f64>,
    ) {
        if at == end {
            if best.is_none_or(|b| so_far < b) {
                *best = Some(so_far);
            }
            return;
        }
        let Some(here) = graph.node(at) else {
            return;
        };
        for next in neighbours(graph, at) {
            if visited.contains(next) {
                continue;
            }
            let Some(there) = graph.node(next) else {
                continue;
            };
            visited.insert(next.to_string());
            walk(graph, next, end, so_far + here.distance_to(there), visited, best);
            visited.remove(next);
        }
    }

    if !graph.contains(start) || !graph.contains(end) {
        return None;
    }
    let mut visited = HashSet::from([start.to_string()]);
    let mut best = None;
    walk(graph, start, end, 0.0, &mut visited, &mut best);
    best
}

/// True if every consecutive pair of ids is joined by an edge
pub fn follows_edges(graph: &Graph, ids: &[&str]) -> bool {
    ids.windows(2)
        .all(|w| neighbours(graph, w[0]).contains(&w[1]))
}
