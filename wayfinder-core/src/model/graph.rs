//! Facility graph components - edges and the adjacency structure

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{NodeId, Weight};

/// Corridor between two locations, one row of the `edges` table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(rename = "from_id")]
    pub from: NodeId,
    #[serde(rename = "to_id")]
    pub to: NodeId,
    /// Walking distance, must be non-negative
    pub distance: Weight,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId, distance: Weight) -> Self {
        Self { from, to, distance }
    }
}

/// Undirected weighted graph stored as an adjacency list
///
/// Every node that appears in an edge owns an entry, and every edge is
/// present in both directions with the same weight.
#[derive(Debug, Clone, Default)]
pub struct FacilityGraph {
    adjacency: HashMap<NodeId, Vec<(NodeId, Weight)>>,
    edge_count: usize,
}

impl FacilityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            adjacency: HashMap::with_capacity(nodes),
            edge_count: 0,
        }
    }

    pub(crate) fn insert_edge(&mut self, edge: &Edge) {
        self.adjacency
            .entry(edge.from)
            .or_default()
            .push((edge.to, edge.distance));
        self.adjacency
            .entry(edge.to)
            .or_default()
            .push((edge.from, edge.distance));
        self.edge_count += 1;
    }

    /// Neighbors of `node` with the connecting weight, empty for unknown nodes
    pub fn neighbors(&self, node: NodeId) -> &[(NodeId, Weight)] {
        self.adjacency
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges the graph was built from
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Total weight of a node sequence, taking the lightest edge between
    /// consecutive nodes. `None` if two consecutive nodes are not adjacent.
    pub fn path_weight(&self, path: &[NodeId]) -> Option<Weight> {
        path.windows(2).try_fold(0.0, |total, pair| {
            self.neighbors(pair[0])
                .iter()
                .filter(|(next, _)| *next == pair[1])
                .map(|&(_, weight)| weight)
                .min_by(f64::total_cmp)
                .map(|weight| total + weight)
        })
    }
}
