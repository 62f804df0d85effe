use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::NodeId;

/// Plan coordinates of a graph node, one row of the `locations` table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(id: NodeId, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

impl From<&Location> for Coord<f64> {
    fn from(location: &Location) -> Self {
        location.coord()
    }
}
