//! Supply-chain fetcher with supersession.
//!
//! Every fetch is issued a [`FetchTicket`] carrying a monotonically
//! increasing sequence number. Only the most recently issued ticket is
//! current; issuing a new one (or calling [`Fetcher::invalidate`]) makes all
//! earlier tickets stale. A stale ticket's response is reported as
//! [`Error::StaleResponse`] and must never reach the view.
//!
//! There is no caching: neighbor connectivity can change between visits, so
//! every navigation step goes back to the source. Superseded requests are
//! not aborted, only ignored once they resolve.

use crate::domain::{ApplicationId, SupplyChainSnapshot};
use crate::error::{Error, Result};
use crate::source::SupplyChainSource;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Handle for one issued fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    target: ApplicationId,
}

impl FetchTicket {
    /// Sequence number of this request
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Application the request is for
    pub fn target(&self) -> &ApplicationId {
        &self.target
    }
}

/// A resolved fetch: the snapshot plus, when lookahead ran, the neighbors
/// found to lead nowhere but back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    /// The snapshot for the ticket's target
    pub snapshot: SupplyChainSnapshot,

    /// Neighbor ids with no neighbors besides the target
    pub dead_ends: HashSet<ApplicationId>,
}

/// Translates application ids into snapshot requests against a source.
pub struct Fetcher {
    source: Arc<dyn SupplyChainSource>,
    latest: AtomicU64,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("latest", &self.latest.load(Ordering::SeqCst))
            .field("source", &"<dyn SupplyChainSource>")
            .finish()
    }
}

impl Fetcher {
    /// Create a fetcher over a source.
    pub fn new(source: Arc<dyn SupplyChainSource>) -> Self {
        Self {
            source,
            latest: AtomicU64::new(0),
        }
    }

    /// The underlying source
    pub fn source(&self) -> &Arc<dyn SupplyChainSource> {
        &self.source
    }

    /// Issue a ticket for `target`, superseding every earlier ticket.
    pub fn issue(&self, target: ApplicationId) -> FetchTicket {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(app_id = %target, seq, "Issued fetch");
        FetchTicket { seq, target }
    }

    /// Supersede every outstanding ticket without issuing a new one.
    pub fn invalidate(&self) {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, "Invalidated outstanding fetches");
    }

    /// Whether `ticket` is still the latest request
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.seq
    }

    /// Resolve a ticket.
    ///
    /// With `lookahead` set, each distinct neighbor is fetched once more to
    /// find dead ends: neighbors whose only neighbor is the target itself. A
    /// failed lookahead fetch leaves that neighbor out of `dead_ends`.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` / `Error::Transient` from the source
    /// - `Error::StaleResponse` if the ticket was superseded while in flight
    pub async fn fetch(&self, ticket: &FetchTicket, lookahead: bool) -> Result<Fetched> {
        let snapshot = self.source.fetch_supply_chain(&ticket.target).await?;
        self.ensure_current(ticket)?;

        let dead_ends = if lookahead {
            let dead_ends = self.look_ahead(&snapshot).await;
            self.ensure_current(ticket)?;
            dead_ends
        } else {
            HashSet::new()
        };

        Ok(Fetched {
            snapshot,
            dead_ends,
        })
    }

    fn ensure_current(&self, ticket: &FetchTicket) -> Result<()> {
        if self.is_current(ticket) {
            Ok(())
        } else {
            debug!(app_id = %ticket.target, seq = ticket.seq, "Dropping stale response");
            Err(Error::StaleResponse {
                target: ticket.target.clone(),
                seq: ticket.seq,
            })
        }
    }

    async fn look_ahead(&self, snapshot: &SupplyChainSnapshot) -> HashSet<ApplicationId> {
        let origin = &snapshot.main_app.id;
        let mut seen = HashSet::new();
        let neighbors: Vec<&ApplicationId> = snapshot
            .upstream_apps
            .iter()
            .chain(&snapshot.downstream_apps)
            .filter(|app| app.is_complete() && app.id != *origin)
            .map(|app| &app.id)
            .filter(|id| seen.insert(*id))
            .collect();

        let lookups = neighbors.iter().map(|id| async move {
            let result = self.source.fetch_supply_chain(id).await;
            (*id, result)
        });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(id, result)| match result {
                Ok(neighborhood) if neighborhood.is_dead_end_from(origin) => Some(id.clone()),
                Ok(_) => None,
                Err(e) => {
                    debug!(app_id = %id, error = %e, "Lookahead fetch failed");
                    None
                }
            })
            .collect()
    }
}
