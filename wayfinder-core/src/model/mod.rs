//! Data model for facility navigation
//!
//! Contains the undirected facility graph and the location table that maps
//! graph nodes onto plan coordinates.

pub mod graph;
pub mod location;

pub use graph::{Edge, FacilityGraph};
pub use location::Location;
