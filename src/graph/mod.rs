//! Building graph model and its JSON format
//!
//! A building is a set of named waypoints connected by undirected corridors.
//! Edge weights are not stored; they are the 3-D distance between endpoints.
//!
//! ```json
//! {
//!   "nodes": [{ "id": "101", "name": "Room 101", "x": 8.0, "y": -4.0, "z": 0.0 }],
//!   "edges": [{ "id": "e1", "source": "lobby", "target": "101" }]
//! }
//! ```

pub mod pathfinder;
pub mod route;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use pathfinder::{Pathfinder, find_path};
pub use route::Route;

pub type NodeId = String;

/// A navigable point in the building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            x,
            y,
            z,
        }
    }

    /// 3-D Euclidean distance, the edge weight used for routing
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance on the floor plan, ignoring height
    pub fn planar_distance_to(&self, other: &Node) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// An undirected corridor between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// An edge that references a node id missing from the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEdge {
    pub edge_id: String,
    pub missing_node: NodeId,
}

/// Bundled building maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Building {
    College,
    Mall,
}

const COLLEGE_JSON: &str = include_str!("assets/college.json");
const MALL_JSON: &str = include_str!("assets/mall.json");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Map shipped with the crate for a building
    pub fn bundled(building: Building) -> Result<Self> {
        match building {
            Building::College => Self::from_json_str(COLLEGE_JSON),
            Building::Mall => Self::from_json_str(MALL_JSON),
        }
    }

    /// Look up a node by id; with duplicate ids the first one wins
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Node lookup table keyed by id, first occurrence wins
    pub fn node_index(&self) -> HashMap<&str, &Node> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            match index.entry(node.id.as_str()) {
                Entry::Vacant(slot) => {
                    slot.insert(node);
                }
                Entry::Occupied(_) => {
                    log::warn!("Duplicate node id {:?}; keeping the first", node.id);
                }
            }
        }
        index
    }

    /// Edges whose endpoints are not in the graph
    pub fn malformed_edges(&self) -> Vec<MalformedEdge> {
        self.edges
            .iter()
            .filter_map(|edge| {
                [&edge.source, &edge.target]
                    .into_iter()
                    .find(|id| !self.contains(id))
                    .map(|missing| MalformedEdge {
                        edge_id: edge.id.clone(),
                        missing_node: missing.clone(),
                    })
            })
            .collect()
    }

    /// `(id, name)` pairs for destination pickers, in map order
    pub fn destinations(&self) -> Vec<(&str, &str)> {
        self.nodes
            .iter()
            .map(|n| (n.id.as_str(), n.name.as_str()))
            .collect()
    }
}
