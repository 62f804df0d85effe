use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dijkstra::{NodeSelection, shortest_path_with};
use super::resolve::resolve_coordinates;
use crate::loading::{FacilityStore, build_graph, validate_edges};
use crate::{Error, NodeId, Polyline};

/// Failure of one stage of a route query
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Origin and destination are the same location ({0})")]
    SameEndpoints(NodeId),
    #[error("Failed to build graph: {0}")]
    GraphBuild(#[source] Error),
    #[error("No path found from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },
    #[error("Failed to fetch coordinates: {0}")]
    Coordinates(#[source] Error),
    #[error("No coordinates known for the path from {from} to {to}")]
    NoCoordinates { from: NodeId, to: NodeId },
}

/// A single origin/destination request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteQuery {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub selection: NodeSelection,
}

impl RouteQuery {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            selection: NodeSelection::default(),
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selection: NodeSelection) -> Self {
        self.selection = selection;
        self
    }
}

/// Resolved route, ready to be drawn and tracked
#[derive(Debug, Clone)]
pub struct Route {
    pub from: NodeId,
    pub to: NodeId,
    /// Shortest node sequence from `from` to `to`
    pub nodes: Vec<NodeId>,
    /// Nodes of the path left out of the polyline for lack of coordinates
    pub dropped_nodes: Vec<NodeId>,
    pub polyline: Polyline,
}

impl Route {
    pub fn total_distance(&self) -> crate::Meters {
        self.polyline.total_distance()
    }

    /// Polyline vertices as `[x, y]` pairs
    pub fn path_coords(&self) -> Vec<[f64; 2]> {
        self.polyline
            .points()
            .iter()
            .map(|coord| [coord.x, coord.y])
            .collect()
    }
}

/// Runs a route query against a store
///
/// The graph is rebuilt from the store on every call; nothing is shared
/// between queries. Stages run in order (build graph, compute path, resolve
/// coordinates) and each one fails with its own [`RouteError`] variant.
///
/// # Errors
///
/// Returns [`RouteError::SameEndpoints`] before touching the store when
/// `from == to`, otherwise the error of the first failing stage
pub fn find_route<S>(store: &S, query: &RouteQuery) -> Result<Route, RouteError>
where
    S: FacilityStore + ?Sized,
{
    let RouteQuery {
        from,
        to,
        selection,
    } = *query;

    if from == to {
        return Err(RouteError::SameEndpoints(from));
    }

    let edges = store.edges().map_err(RouteError::GraphBuild)?;
    validate_edges(&edges).map_err(RouteError::GraphBuild)?;
    let graph = build_graph(&edges);

    let nodes = shortest_path_with(&graph, from, to, selection);
    if nodes.is_empty() {
        return Err(RouteError::NoPath { from, to });
    }

    let lookup = store.locations(&nodes).map_err(RouteError::Coordinates)?;
    let resolution = resolve_coordinates(&nodes, &lookup);
    let polyline =
        Polyline::new(resolution.coords).map_err(|_| RouteError::NoCoordinates { from, to })?;

    info!(
        "Route {from} -> {to}: {} nodes, {} points, distance {}",
        nodes.len(),
        polyline.points().len(),
        polyline.total_distance()
    );

    Ok(Route {
        from,
        to,
        nodes,
        dropped_nodes: resolution.dropped,
        polyline,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use geo::Coord;
    use hashbrown::HashMap;

    use super::*;
    use crate::{Edge, InMemoryStore};

    fn abc_store() -> InMemoryStore {
        InMemoryStore::default()
            .with_edge(1, 2, 3.0)
            .with_edge(2, 3, 4.0)
            .with_location(1, 0.0, 0.0)
            .with_location(2, 3.0, 0.0)
            .with_location(3, 3.0, 4.0)
    }

    /// Store whose reads fail, counting how often it was asked for edges
    #[derive(Default)]
    struct BrokenStore {
        edge_reads: Cell<usize>,
        fail_edges: bool,
    }

    impl FacilityStore for BrokenStore {
        fn edges(&self) -> Result<Vec<Edge>, Error> {
            self.edge_reads.set(self.edge_reads.get() + 1);
            if self.fail_edges {
                Err(Error::IoError(std::io::Error::other("connection refused")))
            } else {
                Ok(vec![Edge::new(1, 2, 1.0)])
            }
        }

        fn locations(&self, _ids: &[NodeId]) -> Result<HashMap<NodeId, Coord<f64>>, Error> {
            Err(Error::IoError(std::io::Error::other("connection reset")))
        }
    }

    #[test]
    fn resolves_worked_example() {
        let route = find_route(&abc_store(), &RouteQuery::new(1, 3)).unwrap();

        assert_eq!(route.nodes, vec![1, 2, 3]);
        assert_eq!(route.total_distance(), 7);
        assert_eq!(route.path_coords(), vec![[0.0, 0.0], [3.0, 0.0], [3.0, 4.0]]);
        assert!(route.dropped_nodes.is_empty());
    }

    #[test]
    fn same_endpoints_rejected_before_store_access() {
        let store = BrokenStore {
            fail_edges: true,
            ..Default::default()
        };
        let result = find_route(&store, &RouteQuery::new(2, 2));

        assert!(matches!(result, Err(RouteError::SameEndpoints(2))));
        assert_eq!(store.edge_reads.get(), 0);
    }

    #[test]
    fn store_failure_is_graph_build_error() {
        let store = BrokenStore {
            fail_edges: true,
            ..Default::default()
        };
        let result = find_route(&store, &RouteQuery::new(1, 2));
        assert!(matches!(result, Err(RouteError::GraphBuild(_))));
    }

    #[test]
    fn location_failure_is_coordinates_error() {
        let result = find_route(&BrokenStore::default(), &RouteQuery::new(1, 2));
        assert!(matches!(result, Err(RouteError::Coordinates(_))));
    }

    #[test]
    fn negative_weight_is_graph_build_error() {
        let store = abc_store().with_edge(1, 3, -10.0);
        let result = find_route(&store, &RouteQuery::new(1, 3));
        assert!(matches!(
            result,
            Err(RouteError::GraphBuild(Error::InvalidData(_)))
        ));
    }

    #[test]
    fn unreachable_and_unknown_nodes() {
        let store = abc_store().with_edge(7, 8, 1.0);
        assert!(matches!(
            find_route(&store, &RouteQuery::new(1, 8)),
            Err(RouteError::NoPath { from: 1, to: 8 })
        ));
        assert!(matches!(
            find_route(&store, &RouteQuery::new(1, 42)),
            Err(RouteError::NoPath { .. })
        ));
        assert!(matches!(
            find_route(&InMemoryStore::default(), &RouteQuery::new(1, 2)),
            Err(RouteError::NoPath { .. })
        ));
    }

    #[test]
    fn missing_interior_coordinate_is_dropped() {
        let store = InMemoryStore::default()
            .with_edge(1, 2, 3.0)
            .with_edge(2, 3, 4.0)
            .with_location(1, 0.0, 0.0)
            .with_location(3, 3.0, 4.0);

        let route = find_route(&store, &RouteQuery::new(1, 3)).unwrap();
        assert_eq!(route.nodes, vec![1, 2, 3]);
        assert_eq!(route.dropped_nodes, vec![2]);
        assert_eq!(route.polyline.points().len(), 2);
        assert_eq!(route.total_distance(), 5);
    }

    #[test]
    fn path_without_any_coordinates() {
        let store = InMemoryStore::default().with_edge(1, 2, 3.0);
        assert!(matches!(
            find_route(&store, &RouteQuery::new(1, 2)),
            Err(RouteError::NoCoordinates { from: 1, to: 2 })
        ));
    }

    #[test]
    fn heap_selection_gives_same_route() {
        let query = RouteQuery::new(3, 1).with_selection(NodeSelection::BinaryHeap);
        let route = find_route(&abc_store(), &query).unwrap();
        assert_eq!(route.nodes, vec![3, 2, 1]);
    }
}
