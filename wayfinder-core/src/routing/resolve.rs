use geo::Coord;
use hashbrown::HashMap;
use log::warn;

use crate::NodeId;

/// Coordinates of a node path, with the nodes that had none
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub coords: Vec<Coord<f64>>,
    pub dropped: Vec<NodeId>,
}

/// Maps a node path onto plan coordinates
///
/// Nodes without a known coordinate are left out of the result. This can
/// shorten or distort the drawn route when interior nodes are missing, so
/// every omission is logged.
pub fn resolve_coordinates(path: &[NodeId], lookup: &HashMap<NodeId, Coord<f64>>) -> Resolution {
    let mut resolution = Resolution {
        coords: Vec::with_capacity(path.len()),
        dropped: Vec::new(),
    };

    for &node in path {
        match lookup.get(&node) {
            Some(coord) => resolution.coords.push(*coord),
            None => resolution.dropped.push(node),
        }
    }

    if !resolution.dropped.is_empty() {
        warn!(
            "{} of {} path nodes have no coordinates and were dropped: {:?}",
            resolution.dropped.len(),
            path.len(),
            resolution.dropped
        );
    }

    resolution
}
