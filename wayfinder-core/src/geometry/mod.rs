//! Planar route geometry and great-circle distance helpers

mod haversine;
mod polyline;

pub use haversine::{EARTH_RADIUS_METERS, haversine_distance};
pub use polyline::{Polyline, RoutePosition};
