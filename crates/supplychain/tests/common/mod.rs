//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use supplychain::domain::{Application, ApplicationId, ApplicationRecord, SupplyChainSnapshot};
use supplychain::error::Result;
use supplychain::source::{InMemorySource, SupplyChainSource};
use tokio::sync::Notify;

/// Run the supplychain binary in `dir`, feeding `stdin` if given.
pub fn run_supplychain_in_dir(dir: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_supplychain"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute supplychain binary");

    {
        let mut pipe = child.stdin.take().expect("stdin is piped");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes())
                .expect("Failed to write stdin");
        }
    }

    child.wait_with_output().expect("Failed to wait for supplychain")
}

/// Write application records, one JSON object per line.
pub fn write_records(path: &Path, records: &[ApplicationRecord]) {
    let mut file = std::fs::File::create(path).expect("Failed to create records file");
    for record in records {
        let line = serde_json::to_string(record).expect("Failed to serialize record");
        writeln!(file, "{line}").expect("Failed to write record");
    }
}

/// A small supply chain:
///
/// ```text
/// ledger -> billing -> invoicing -> reporting
///           billing -> audit
/// ```
pub fn sample_records() -> Vec<ApplicationRecord> {
    vec![
        ApplicationRecord::new("billing", "Billing")
            .with_upstream("ledger", "Ledger")
            .with_downstream("invoicing", "Invoicing")
            .with_downstream("audit", "Audit"),
        ApplicationRecord::new("invoicing", "Invoicing").with_downstream("reporting", "Reporting"),
    ]
}

/// In-memory source seeded with [`sample_records`]
pub async fn sample_source() -> InMemorySource {
    let source = InMemorySource::new();
    for record in sample_records() {
        source.register(record).await;
    }
    source
}

/// Holds fetches for selected ids until released, and counts every fetch.
pub struct GatedSource {
    inner: InMemorySource,
    gates: HashMap<ApplicationId, Arc<Notify>>,
    fetches: AtomicUsize,
}

impl GatedSource {
    /// Gate fetches of `gated` ids over `inner`.
    pub fn new(inner: InMemorySource, gated: &[&str]) -> Self {
        Self {
            inner,
            gates: gated
                .iter()
                .map(|id| (ApplicationId::new(*id), Arc::new(Notify::new())))
                .collect(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Let one pending (or the next) fetch of `id` through.
    pub fn release(&self, id: &str) {
        if let Some(gate) = self.gates.get(&ApplicationId::new(id)) {
            gate.notify_one();
        }
    }

    /// Number of fetches started so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SupplyChainSource for GatedSource {
    async fn fetch_supply_chain(&self, id: &ApplicationId) -> Result<SupplyChainSnapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(id) {
            gate.notified().await;
        }
        self.inner.fetch_supply_chain(id).await
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        self.inner.list_applications().await
    }
}
