//! Core in-memory source data structures.
//!
//! This module contains the inner structure that holds all data and is
//! wrapped in `Arc<Mutex<>>` for thread safety.

use super::graph::{ensure_node, link};
use crate::domain::{ApplicationDetails, ApplicationId, ApplicationRecord};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// What is stored per application besides its graph node
#[derive(Debug, Clone, Default)]
pub(super) struct StoredApplication {
    pub(super) name: String,
    pub(super) details: ApplicationDetails,
}

/// Result of registering one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterOutcome {
    /// Whether the record itself was accepted
    pub accepted: bool,

    /// Relations that were created by this registration
    pub relations_added: usize,

    /// Relations skipped for a missing id or name, or for pointing at the
    /// application itself
    pub relations_skipped: usize,
}

/// Inner source structure (not thread-safe).
///
/// # Graph Representation
///
/// Edges are directed **provider -> consumer**. See the module-level
/// documentation for details.
#[derive(Default)]
pub(crate) struct InMemorySourceInner {
    /// Applications indexed by ID for O(1) lookups
    pub(super) applications: HashMap<ApplicationId, StoredApplication>,

    /// Relationship graph. Nodes hold `ApplicationId`s; edges carry no weight.
    pub(super) graph: DiGraph<ApplicationId, ()>,

    /// Mapping from ApplicationId to graph NodeIndex.
    ///
    /// Every key of `applications` has an entry here.
    pub(super) node_map: HashMap<ApplicationId, NodeIndex>,
}

impl InMemorySourceInner {
    pub(super) fn register(&mut self, record: ApplicationRecord) -> RegisterOutcome {
        let mut outcome = RegisterOutcome::default();

        if record.application_id.is_empty() || record.application_name.is_empty() {
            tracing::debug!(app_id = %record.application_id, "Rejecting incomplete record");
            return outcome;
        }
        outcome.accepted = true;

        let main_id = record.application_id;
        let main = self.upsert(&main_id, &record.application_name, record.details);

        for upstream in record.upstream_apps {
            if !upstream.is_complete() || upstream.app_id == main_id {
                outcome.relations_skipped += 1;
                continue;
            }
            let provider = self.ensure(&upstream.app_id, &upstream.app_name);
            if link(&mut self.graph, provider, main) {
                outcome.relations_added += 1;
            }
        }

        for downstream in record.downstream_apps {
            if !downstream.is_complete() || downstream.app_id == main_id {
                outcome.relations_skipped += 1;
                continue;
            }
            let consumer = self.ensure(&downstream.app_id, &downstream.app_name);
            if link(&mut self.graph, main, consumer) {
                outcome.relations_added += 1;
            }
        }

        outcome
    }

    /// Create an application or replace its name and details, returning its node.
    fn upsert(
        &mut self,
        id: &ApplicationId,
        name: &str,
        details: ApplicationDetails,
    ) -> NodeIndex {
        let node = ensure_node(&mut self.graph, &mut self.node_map, id);
        let stored = self.applications.entry(id.clone()).or_default();
        stored.name = name.to_string();
        stored.details = details;
        node
    }

    /// Create a placeholder for a referenced neighbor; a known application
    /// keeps its name.
    fn ensure(&mut self, id: &ApplicationId, name: &str) -> NodeIndex {
        let node = ensure_node(&mut self.graph, &mut self.node_map, id);
        self.applications
            .entry(id.clone())
            .or_insert_with(|| StoredApplication {
                name: name.to_string(),
                details: ApplicationDetails::default(),
            });
        node
    }
}
