//! Shortest route computation: graph search, coordinate resolution and the
//! staged route query pipeline

pub mod dijkstra;
mod resolve;
mod route;
mod to_geojson;

pub use dijkstra::{NodeSelection, shortest_path, shortest_path_with};
pub use resolve::{Resolution, resolve_coordinates};
pub use route::{Route, RouteError, RouteQuery, find_route};
