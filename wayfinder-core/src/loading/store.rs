use geo::Coord;
use hashbrown::HashMap;

use crate::{Edge, Error, Location, NodeId};

/// Source of the `edges(from_id, to_id, distance)` and `locations(id, x, y)`
/// tables
///
/// Both reads are separate stages of a route query, so implementations are
/// expected to hit the backing storage on every call.
pub trait FacilityStore {
    /// All corridor edges of the facility
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read
    fn edges(&self) -> Result<Vec<Edge>, Error>;

    /// Coordinates for the requested nodes; nodes without a location are
    /// simply absent from the result
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read
    fn locations(&self, ids: &[NodeId]) -> Result<HashMap<NodeId, Coord<f64>>, Error>;
}

/// Store kept entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    edges: Vec<Edge>,
    locations: HashMap<NodeId, Coord<f64>>,
}

impl InMemoryStore {
    pub fn new(edges: Vec<Edge>, locations: impl IntoIterator<Item = Location>) -> Self {
        Self {
            edges,
            locations: locations
                .into_iter()
                .map(|location| (location.id, location.coord()))
                .collect(),
        }
    }

    #[must_use]
    pub fn with_edge(mut self, from: NodeId, to: NodeId, distance: f64) -> Self {
        self.edges.push(Edge::new(from, to, distance));
        self
    }

    #[must_use]
    pub fn with_location(mut self, id: NodeId, x: f64, y: f64) -> Self {
        self.locations.insert(id, Coord { x, y });
        self
    }
}

impl FacilityStore for InMemoryStore {
    fn edges(&self) -> Result<Vec<Edge>, Error> {
        Ok(self.edges.clone())
    }

    fn locations(&self, ids: &[NodeId]) -> Result<HashMap<NodeId, Coord<f64>>, Error> {
        Ok(ids
            .iter()
            .filter_map(|id| self.locations.get(id).map(|coord| (*id, *coord)))
            .collect())
    }
}
