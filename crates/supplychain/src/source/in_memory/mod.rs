//! In-memory source backed by HashMap and petgraph.
//!
//! All data is held in RAM and **lost when the process exits**. The source
//! can be seeded from a JSONL file of [`ApplicationRecord`]s via
//! [`load_from_jsonl`], or filled programmatically with
//! [`InMemorySource::register`].
//!
//! # Graph Representation and Edge Direction Convention
//!
//! The relationship graph uses a **provider -> consumer** edge direction:
//!
//! - **Edge source**: the application that provides data
//! - **Edge target**: the application that consumes it
//!
//! So for an application `A`, incoming edges come from its upstream
//! applications and outgoing edges lead to its downstream applications.
//!
//! # Registration Semantics
//!
//! Registration merges rather than inserts:
//!
//! - Re-registering an id replaces its name and all of its details; a
//!   field the new record leaves out is cleared
//! - A referenced neighbor that is not yet known is created with the name
//!   given in the relation
//! - A relation is created at most once, no matter how often it is repeated
//! - Relations missing an id or a name are skipped
//! - Relations from an application to itself are skipped
//!
//! # Thread Safety
//!
//! The inner state lives behind `Arc<Mutex<_>>` (tokio mutex), so clones of
//! an [`InMemorySource`] share the same graph.

mod graph;
mod inner;
mod jsonl;
mod trait_impl;

use crate::domain::ApplicationRecord;
use inner::InMemorySourceInner;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use inner::RegisterOutcome;
pub use jsonl::{append_record, load_from_jsonl, LoadWarning};

/// Thread-safe in-memory source.
///
/// Cloning is cheap and shares state.
#[derive(Clone, Default)]
pub struct InMemorySource {
    inner: Arc<Mutex<InMemorySourceInner>>,
}

impl std::fmt::Debug for InMemorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySource").finish_non_exhaustive()
    }
}

impl InMemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an application and its relations.
    ///
    /// See the module documentation for the merge rules. Records without an
    /// id or a name are rejected and reported in the outcome.
    pub async fn register(&self, record: ApplicationRecord) -> RegisterOutcome {
        let mut inner = self.inner.lock().await;
        inner.register(record)
    }

    /// Number of known applications
    pub async fn len(&self) -> usize {
        self.inner.lock().await.applications.len()
    }

    /// Whether no application is known
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
