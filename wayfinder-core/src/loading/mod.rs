//! This module is responsible for reading the facility tables from a store
//! and building the adjacency graph used for routing.

mod builder;
mod csv_store;
mod store;

pub use builder::{build_graph, validate_edges};
pub use csv_store::CsvStore;
pub use store::{FacilityStore, InMemoryStore};
