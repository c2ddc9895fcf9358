//! Graph builder: snapshot to positioned nodes and edges.
//!
//! [`build`] is a pure function. Building the same snapshot twice gives
//! equal graphs, and edge ids derive from their endpoints only, so a
//! re-render never produces duplicate or ghost edges.
//!
//! Edge ids have the form `e{source}-{target}`. Ids that contain `-` can make
//! two different endpoint pairs format the same (`x-y -> x` and `x -> y-x`
//! both give `ex-y-x`); a repeated id within one graph gets a `#n` suffix.
//!
//! # Neighbor Filtering
//!
//! A neighbor entry is left out of the graph when:
//!
//! - its id or name is missing
//! - it refers to the main application itself
//! - the same id already appeared earlier in the same row
//!
//! An application that is both upstream and downstream of the main one (a
//! two-node cycle) shows up once in each row. Positions are assigned over the
//! entries that survive filtering, so every row stays centered.

mod layout;

pub use layout::{
    LayoutConfig, Position, DEFAULT_CENTER_X, DEFAULT_CENTER_Y, DEFAULT_ROW_OFFSET,
    DEFAULT_SPACING,
};

use crate::domain::{Application, ApplicationId, SupplyChainSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Where a node sits relative to the main application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// The centered application
    Main,
    /// Feeds into the centered application
    Upstream,
    /// Consumes the centered application
    Downstream,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Main => write!(f, "main"),
            NodeRole::Upstream => write!(f, "upstream"),
            NodeRole::Downstream => write!(f, "downstream"),
        }
    }
}

/// A positioned node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Application id
    pub id: ApplicationId,
    /// Display label
    pub label: String,
    /// Role relative to the main application
    pub role: NodeRole,
    /// Assigned position
    pub position: Position,
    /// Whether clicking the node re-centers the view
    pub clickable: bool,
}

/// A directed edge, always upstream -> main or main -> downstream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Deterministic id derived from the endpoints
    pub id: String,
    /// Providing application
    pub source: ApplicationId,
    /// Consuming application
    pub target: ApplicationId,
}

impl GraphEdge {
    /// Create an edge; the id is `e{source}-{target}`.
    ///
    /// The id alone is not guaranteed unique across endpoint pairs; the
    /// builder disambiguates collisions within a graph.
    pub fn new(source: ApplicationId, target: ApplicationId) -> Self {
        Self {
            id: format!("e{source}-{target}"),
            source,
            target,
        }
    }
}

/// Nodes and edges for one centered application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplyChainGraph {
    /// Main node first, then the upstream row, then the downstream row
    pub nodes: Vec<GraphNode>,
    /// Upstream edges first, then downstream edges
    pub edges: Vec<GraphEdge>,
}

impl SupplyChainGraph {
    /// The main node, if the graph is not empty
    pub fn main_node(&self) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.role == NodeRole::Main)
    }

    /// First node with the given id
    pub fn node(&self, id: &ApplicationId) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == *id)
    }

    /// Nodes with the given role, in row order
    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(move |node| node.role == role)
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Build the graph for a snapshot with every neighbor clickable.
pub fn build(snapshot: &SupplyChainSnapshot, layout: &LayoutConfig) -> SupplyChainGraph {
    build_with_dead_ends(snapshot, layout, &HashSet::new())
}

/// Build the graph for a snapshot, marking `dead_ends` as not clickable.
pub fn build_with_dead_ends(
    snapshot: &SupplyChainSnapshot,
    layout: &LayoutConfig,
    dead_ends: &HashSet<ApplicationId>,
) -> SupplyChainGraph {
    let main = &snapshot.main_app;
    let upstream = included_neighbors(&snapshot.upstream_apps, &main.id);
    let downstream = included_neighbors(&snapshot.downstream_apps, &main.id);

    let mut nodes = Vec::with_capacity(1 + upstream.len() + downstream.len());
    let mut edges = Vec::with_capacity(upstream.len() + downstream.len());

    nodes.push(GraphNode {
        id: main.id.clone(),
        label: main.name.clone(),
        role: NodeRole::Main,
        position: layout.center(),
        clickable: false,
    });

    for (app, position) in upstream.iter().zip(layout.upstream_row(upstream.len())) {
        nodes.push(neighbor_node(app, NodeRole::Upstream, position, dead_ends));
        edges.push(GraphEdge::new(app.id.clone(), main.id.clone()));
    }

    for (app, position) in downstream.iter().zip(layout.downstream_row(downstream.len())) {
        nodes.push(neighbor_node(app, NodeRole::Downstream, position, dead_ends));
        edges.push(GraphEdge::new(main.id.clone(), app.id.clone()));
    }
    disambiguate_edge_ids(&mut edges);

    SupplyChainGraph { nodes, edges }
}

fn disambiguate_edge_ids(edges: &mut [GraphEdge]) {
    let mut used = HashSet::with_capacity(edges.len());
    for edge in edges.iter_mut() {
        if used.insert(edge.id.clone()) {
            continue;
        }
        let mut n = 1;
        while !used.insert(format!("{}#{n}", edge.id)) {
            n += 1;
        }
        tracing::debug!(edge = %edge.id, n, "Edge id collision");
        edge.id = format!("{}#{n}", edge.id);
    }
}

fn included_neighbors<'a>(apps: &'a [Application], main_id: &ApplicationId) -> Vec<&'a Application> {
    let mut seen = HashSet::new();
    apps.iter()
        .filter(|app| {
            if !app.is_complete() {
                tracing::debug!(app_id = %app.id, "Skipping incomplete neighbor");
                return false;
            }
            app.id != *main_id && seen.insert(&app.id)
        })
        .collect()
}

fn neighbor_node(
    app: &Application,
    role: NodeRole,
    position: Position,
    dead_ends: &HashSet<ApplicationId>,
) -> GraphNode {
    GraphNode {
        id: app.id.clone(),
        label: app.name.clone(),
        role,
        position,
        clickable: !dead_ends.contains(&app.id),
    }
}
