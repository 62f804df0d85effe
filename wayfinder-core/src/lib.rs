//! Indoor wayfinding core: shortest routes over a facility graph and
//! sensor-driven progress tracking along the resulting polyline.

pub mod error;
pub mod geometry;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod tracking;

pub use error::Error;
pub use geometry::{Polyline, RoutePosition};
pub use loading::{CsvStore, FacilityStore, InMemoryStore, build_graph, validate_edges};
pub use model::{Edge, FacilityGraph, Location};
pub use routing::{NodeSelection, Route, RouteError, RouteQuery, find_route, shortest_path};
pub use tracking::{NavigationSession, ProgressSnapshot, ProgressTracker, TrackerConfig};

/// Identifier of a location node, as stored in the `edges` and `locations` tables
pub type NodeId = u32;

/// Edge weight as read from the store
pub type Weight = f64;

/// Whole distance units used for walked, remaining and segment lengths
pub type Meters = u32;

/// Sensor timestamp in milliseconds
pub type Millis = u64;
