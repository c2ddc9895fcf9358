//! Relationship graph operations using petgraph.
//!
//! Only one-hop queries live here; the navigator never needs more than the
//! direct neighbors of the centered application.

use super::inner::StoredApplication;
use crate::domain::{Application, ApplicationId};
use crate::error::{Error, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Return the node for `id`, adding it to the graph if needed.
pub(super) fn ensure_node(
    graph: &mut DiGraph<ApplicationId, ()>,
    node_map: &mut HashMap<ApplicationId, NodeIndex>,
    id: &ApplicationId,
) -> NodeIndex {
    *node_map
        .entry(id.clone())
        .or_insert_with(|| graph.add_node(id.clone()))
}

/// Add a provider -> consumer edge unless it already exists.
///
/// Returns `true` if an edge was added.
pub(super) fn link(
    graph: &mut DiGraph<ApplicationId, ()>,
    provider: NodeIndex,
    consumer: NodeIndex,
) -> bool {
    if graph.find_edge(provider, consumer).is_some() {
        return false;
    }
    graph.add_edge(provider, consumer, ());
    true
}

/// Collect the distinct direct neighbors of `id` in one direction.
///
/// `Direction::Incoming` yields upstream applications, `Direction::Outgoing`
/// downstream ones. The result is sorted by name, then id, so repeated
/// fetches return the same order.
pub(super) fn neighbors_impl(
    graph: &DiGraph<ApplicationId, ()>,
    node_map: &HashMap<ApplicationId, NodeIndex>,
    applications: &HashMap<ApplicationId, StoredApplication>,
    id: &ApplicationId,
    direction: Direction,
) -> Result<Vec<Application>> {
    let node = node_map
        .get(id)
        .ok_or_else(|| Error::NotFound(id.clone()))?;

    let mut seen = HashSet::new();
    let mut result: Vec<Application> = graph
        .neighbors_directed(*node, direction)
        .filter(|neighbor| seen.insert(*neighbor))
        .map(|neighbor| {
            let neighbor_id = &graph[neighbor];
            let name = applications
                .get(neighbor_id)
                .map(|stored| stored.name.clone())
                .unwrap_or_default();
            Application::new(neighbor_id.clone(), name)
        })
        .collect();

    result.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(result)
}
