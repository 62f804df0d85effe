// Re-export key components
pub use crate::geometry::{EARTH_RADIUS_METERS, Polyline, RoutePosition, haversine_distance};
pub use crate::loading::{CsvStore, FacilityStore, InMemoryStore, build_graph, validate_edges};
pub use crate::model::{Edge, FacilityGraph, Location};
pub use crate::routing::{
    NodeSelection, Route, RouteError, RouteQuery, find_route, resolve_coordinates, shortest_path,
    shortest_path_with,
};
pub use crate::tracking::{
    AccelerationSample, GeoFix, NavigationSession, ProgressSink, ProgressSnapshot,
    ProgressTracker, RouteTicket, SensorPermission, SensorSource, SessionError, TrackerConfig,
    WalkPhase, WalkState,
};

// Core scalar types
pub use crate::Error;
pub use crate::Meters;
pub use crate::Millis;
pub use crate::NodeId;
pub use crate::Weight;
