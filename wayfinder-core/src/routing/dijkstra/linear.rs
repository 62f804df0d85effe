use hashbrown::HashSet;

use super::SearchTree;
use crate::{FacilityGraph, NodeId};

/// Dijkstra search that picks the next node by scanning the open set
pub(super) fn search(graph: &FacilityGraph, start: NodeId, end: NodeId) -> SearchTree {
    let mut tree = SearchTree::with_start(start, graph.node_count());
    // Reached but not yet finalized nodes
    let mut open: HashSet<NodeId> = HashSet::with_capacity(graph.node_count());
    open.insert(start);

    while let Some(node) = closest_open(&open, &tree) {
        open.remove(&node);

        if node == end {
            break;
        }

        let cost = tree.distances[&node];
        for &(next, weight) in graph.neighbors(node) {
            if tree.relax(node, next, cost + weight) {
                open.insert(next);
            }
        }
    }

    tree
}

fn closest_open(open: &HashSet<NodeId>, tree: &SearchTree) -> Option<NodeId> {
    open.iter()
        .map(|&node| (node, tree.distances[&node]))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(node, _)| node)
}
