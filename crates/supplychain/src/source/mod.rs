//! Source abstraction for supply-chain data.
//!
//! The navigator depends on exactly one collaborator: something that can
//! describe an application together with its immediate neighbors, and list
//! the applications it knows about. Both calls are treated as remote, slow
//! and fallible.
//!
//! Implementations:
//!
//! - **In-memory**: a `petgraph` relationship graph, optionally loaded from a
//!   JSONL file of application records
//! - **Mock** (`test-util` feature): canned answers for tests
//!
//! # Example
//!
//! ```no_run
//! use supplychain::domain::ApplicationId;
//! use supplychain::source::{SupplyChainSource, SourceBackend, create_source};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let (source, _warnings) = create_source(SourceBackend::InMemory).await?;
//!     let snapshot = source.fetch_supply_chain(&ApplicationId::new("billing")).await;
//!     println!("{snapshot:?}");
//!     Ok(())
//! }
//! ```

use crate::domain::{Application, ApplicationId, SupplyChainSnapshot};
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

pub mod in_memory;

pub use in_memory::{InMemorySource, LoadWarning};

/// The collaborator the navigator fetches from.
///
/// Implementations must be `Send + Sync` so fetches can run on the tokio
/// runtime while the navigator keeps handling commands. The trait is
/// object-safe and is normally held as `Arc<dyn SupplyChainSource>`.
///
/// # Error Handling
///
/// - `Error::NotFound`: the id does not resolve
/// - `Error::Transient`: any I/O or backend failure
#[async_trait]
pub trait SupplyChainSource: Send + Sync {
    /// Describe `id` together with its direct upstream and downstream neighbors.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the application is unknown, and
    /// `Error::Transient` if the backend could not be reached.
    async fn fetch_supply_chain(&self, id: &ApplicationId) -> Result<SupplyChainSnapshot>;

    /// List every known application.
    ///
    /// Names may repeat; deduplication is the directory's job.
    async fn list_applications(&self) -> Result<Vec<Application>>;
}

/// Source backend type
#[derive(Debug, Clone)]
pub enum SourceBackend {
    /// Empty in-memory relationship graph
    InMemory,

    /// In-memory relationship graph seeded from a JSONL file of records
    Jsonl(PathBuf),
}

/// Create a source from a backend description.
///
/// A JSONL path that does not exist yields an empty source, the same as
/// [`SourceBackend::InMemory`]. Load warnings are returned alongside the
/// source; they have already been logged.
///
/// # Errors
///
/// Returns `Error::Io` if the JSONL file exists but cannot be read.
pub async fn create_source(
    backend: SourceBackend,
) -> Result<(Arc<dyn SupplyChainSource>, Vec<LoadWarning>)> {
    match backend {
        SourceBackend::InMemory => Ok((Arc::new(InMemorySource::new()), Vec::new())),
        SourceBackend::Jsonl(path) => {
            if !path.exists() {
                tracing::warn!(path = %path.display(), "Data file not found, starting empty");
                return Ok((Arc::new(InMemorySource::new()), Vec::new()));
            }
            let (source, warnings) = in_memory::load_from_jsonl(&path).await?;
            for warning in &warnings {
                tracing::warn!(warning = ?warning, "JSONL load warning");
            }
            Ok((Arc::new(source), warnings))
        }
    }
}

// ========== Test Utilities ==========

/// Fixed ID that [`MockSource`] resolves.
#[cfg(any(test, feature = "test-util"))]
pub const MOCK_APPLICATION_ID: &str = "mock-main";

/// A mock source for testing.
///
/// Resolves [`MOCK_APPLICATION_ID`] to a snapshot with one upstream and one
/// downstream neighbor; every other id is `NotFound`.
///
/// # Availability
///
/// Only available when running tests or with the `test-util` feature enabled.
#[cfg(any(test, feature = "test-util"))]
#[derive(Clone, Copy, Debug, Default)]
#[non_exhaustive]
pub struct MockSource;

#[cfg(any(test, feature = "test-util"))]
impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self
    }

    /// The snapshot returned for [`MOCK_APPLICATION_ID`].
    pub fn mock_snapshot() -> SupplyChainSnapshot {
        SupplyChainSnapshot {
            main_app: Application::new(MOCK_APPLICATION_ID, "Mock Main"),
            upstream_apps: vec![Application::new("mock-up", "Mock Upstream")],
            downstream_apps: vec![Application::new("mock-down", "Mock Downstream")],
            main_details: None,
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl SupplyChainSource for MockSource {
    async fn fetch_supply_chain(&self, id: &ApplicationId) -> Result<SupplyChainSnapshot> {
        if id.as_str() == MOCK_APPLICATION_ID {
            Ok(Self::mock_snapshot())
        } else {
            Err(crate::error::Error::NotFound(id.clone()))
        }
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        let snapshot = Self::mock_snapshot();
        let mut apps = vec![snapshot.main_app];
        apps.extend(snapshot.upstream_apps);
        apps.extend(snapshot.downstream_apps);
        Ok(apps)
    }
}
