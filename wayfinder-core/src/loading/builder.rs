use log::debug;

use crate::{Edge, Error, FacilityGraph};

/// Builds an undirected adjacency graph from a flat edge list
///
/// Each edge is inserted in both directions with the same weight. Weights
/// are not checked here; shortest path search relies on them being
/// non-negative, see [`validate_edges`].
pub fn build_graph<'a, I>(edges: I) -> FacilityGraph
where
    I: IntoIterator<Item = &'a Edge>,
{
    let edges = edges.into_iter();
    let mut graph = FacilityGraph::with_capacity(edges.size_hint().0);

    for edge in edges {
        graph.insert_edge(edge);
    }

    debug!(
        "Built facility graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    graph
}

/// Rejects edge lists that would break shortest path search
///
/// # Errors
///
/// Returns [`Error::InvalidData`] for the first edge with a negative or
/// non-finite distance
pub fn validate_edges(edges: &[Edge]) -> Result<(), Error> {
    if let Some(edge) = edges
        .iter()
        .find(|edge| !edge.distance.is_finite() || edge.distance < 0.0)
    {
        return Err(Error::InvalidData(format!(
            "Edge {} - {} has invalid distance {}",
            edge.from, edge.to, edge.distance
        )));
    }
    Ok(())
}
