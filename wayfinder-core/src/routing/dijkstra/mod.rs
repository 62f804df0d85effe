//! Dijkstra's algorithm over the facility graph
//!
//! Two frontier selection strategies share the same relaxation and path
//! reconstruction. The linear scan is O(V²) and fine for a single
//! facility; the binary heap variant is O((V + E) log V) for larger graphs.

mod heap;
mod linear;
mod state;

use hashbrown::HashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{FacilityGraph, NodeId, Weight};

/// How the next node to finalize is picked from the frontier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSelection {
    /// Scan every open node for the smallest tentative distance
    #[default]
    LinearScan,
    /// Pop the smallest tentative distance from a priority queue
    BinaryHeap,
}

/// Tentative distances and predecessor links left behind by a search
#[derive(Debug, Default)]
pub(super) struct SearchTree {
    pub(super) distances: HashMap<NodeId, Weight>,
    pub(super) predecessors: HashMap<NodeId, NodeId>,
}

impl SearchTree {
    fn with_start(start: NodeId, capacity: usize) -> Self {
        let mut distances = HashMap::with_capacity(capacity);
        distances.insert(start, 0.0);
        Self {
            distances,
            predecessors: HashMap::with_capacity(capacity),
        }
    }

    /// Records `next_cost` for `next` if it improves on the best known
    /// distance. Returns true when the distance changed.
    fn relax(&mut self, node: NodeId, next: NodeId, next_cost: Weight) -> bool {
        match self.distances.entry(next) {
            hashbrown::hash_map::Entry::Vacant(entry) => {
                entry.insert(next_cost);
                self.predecessors.insert(next, node);
                true
            }
            hashbrown::hash_map::Entry::Occupied(mut entry) => {
                if next_cost < *entry.get() {
                    *entry.get_mut() = next_cost;
                    self.predecessors.insert(next, node);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Follows predecessor links from `end` back to `start`
    fn path_to(&self, start: NodeId, end: NodeId) -> Vec<NodeId> {
        if !self.distances.contains_key(&end) {
            return Vec::new();
        }

        let mut path = vec![end];
        let mut current = end;
        while current != start {
            match self.predecessors.get(&current) {
                Some(&prev) => {
                    path.push(prev);
                    current = prev;
                }
                None => return Vec::new(),
            }
        }
        path.reverse(); // Now path is from start to end
        path
    }
}

/// Shortest path between two nodes using the default [`NodeSelection`]
///
/// Returns the node sequence from `start` to `end`, or an empty vector when
/// either node is not in the graph or `end` is unreachable. Weights must be
/// non-negative. Among equally short paths any one may be returned.
pub fn shortest_path(graph: &FacilityGraph, start: NodeId, end: NodeId) -> Vec<NodeId> {
    shortest_path_with(graph, start, end, NodeSelection::default())
}

/// Shortest path between two nodes with an explicit frontier strategy
pub fn shortest_path_with(
    graph: &FacilityGraph,
    start: NodeId,
    end: NodeId,
    selection: NodeSelection,
) -> Vec<NodeId> {
    if !graph.contains(start) || !graph.contains(end) {
        debug!("Node {start} or {end} is not part of the facility graph");
        return Vec::new();
    }

    let tree = match selection {
        NodeSelection::LinearScan => linear::search(graph, start, end),
        NodeSelection::BinaryHeap => heap::search(graph, start, end),
    };

    let path = tree.path_to(start, end);
    if path.is_empty() {
        debug!("No path from {start} to {end}");
    } else {
        debug!(
            "Path from {start} to {end}: {} nodes, distance {}",
            path.len(),
            tree.distances[&end]
        );
    }
    path
}
