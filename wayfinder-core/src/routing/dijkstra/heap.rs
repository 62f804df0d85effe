use std::collections::BinaryHeap;

use super::SearchTree;
use super::state::State;
use crate::{FacilityGraph, NodeId};

/// Dijkstra search with a binary heap frontier
pub(super) fn search(graph: &FacilityGraph, start: NodeId, end: NodeId) -> SearchTree {
    let mut tree = SearchTree::with_start(start, graph.node_count());
    let mut heap = BinaryHeap::with_capacity(graph.node_count() / 4 + 1);

    heap.push(State {
        cost: 0.0,
        node: start,
    });

    while let Some(State { cost, node }) = heap.pop() {
        // Check if we've reached the target
        if node == end {
            break;
        }

        // Skip stale heap entries
        if cost > tree.distances[&node] {
            continue;
        }

        for &(next, weight) in graph.neighbors(node) {
            let next_cost = cost + weight;
            if tree.relax(node, next, next_cost) {
                heap.push(State {
                    cost: next_cost,
                    node: next,
                });
            }
        }
    }

    tree
}
