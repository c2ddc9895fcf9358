//! Navigator: the state machine that owns the current view.
//!
//! # States
//!
//! - **Idle**: nothing selected, the view is empty
//! - **Viewing**: one application is centered
//!
//! # Transitions
//!
//! Every gesture arrives as a [`Command`]. Handling one is split in two:
//!
//! 1. [`Navigator::begin`] decides synchronously. It either rejects the
//!    command as a no-op, applies it at once (`Clear`), or issues a fetch
//!    ticket and returns a [`PendingFetch`].
//! 2. [`Navigator::complete`] takes the resolved fetch. If its ticket is still
//!    the latest one, the new graph, history and center replace the old ones
//!    together; a failure leaves everything as it was and yields a [`Report`].
//!
//! Nothing is mutated between the two halves, so any number of fetches can be
//! in flight while commands keep arriving. Only the last one issued can land.
//! [`Navigator::dispatch`] runs both halves back to back, and
//! [`NavigatorRuntime`] drives them concurrently over channels.

mod runtime;

pub use runtime::{CommandSender, NavigatorHandle, NavigatorRuntime, Settled};

use crate::config::NavigatorConfig;
use crate::domain::{ApplicationDetails, ApplicationId, HistoryEntry};
use crate::error::{Error, Result, Severity};
use crate::fetcher::{FetchTicket, Fetched, Fetcher};
use crate::graph::{self, GraphEdge, GraphNode, LayoutConfig, SupplyChainGraph};
use crate::history::NavigationHistory;
use crate::source::SupplyChainSource;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// A user gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Pick an application from the directory; starts a fresh trail
    Select(ApplicationId),
    /// Click a node in the current graph
    ClickNode(ApplicationId),
    /// Click the breadcrumb at this index
    ClickBreadcrumb(usize),
    /// Drop the selection and return to idle
    Clear,
}

/// Where the navigator stands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NavigatorState {
    /// Nothing selected
    #[default]
    Idle,
    /// An application is centered
    Viewing {
        /// The centered application
        center: ApplicationId,
    },
}

impl NavigatorState {
    /// The centered application, if any
    pub fn center(&self) -> Option<&ApplicationId> {
        match self {
            NavigatorState::Idle => None,
            NavigatorState::Viewing { center } => Some(center),
        }
    }
}

/// Everything a presentation layer needs to render
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    /// Positioned nodes, main first
    pub nodes: Vec<GraphNode>,
    /// Directed edges
    pub edges: Vec<GraphEdge>,
    /// Breadcrumb trail, oldest first
    pub history: Vec<HistoryEntry>,
    /// The centered application
    pub center_app_id: Option<ApplicationId>,
    /// Descriptive fields of the centered application
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_details: Option<ApplicationDetails>,
}

impl ViewState {
    /// Whether nothing is selected
    pub fn is_idle(&self) -> bool {
        self.center_app_id.is_none()
    }
}

/// A failure surfaced to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Human-readable description
    pub message: String,
    /// How loudly to show it
    pub severity: Severity,
}

/// How history changes once a fetch lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryUpdate {
    Reset,
    Advance,
    TruncateTo(usize),
}

/// A fetch issued by [`Navigator::begin`], waiting to be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    ticket: FetchTicket,
    update: HistoryUpdate,
}

impl PendingFetch {
    /// The issued ticket
    pub fn ticket(&self) -> &FetchTicket {
        &self.ticket
    }

    /// Application being fetched
    pub fn target(&self) -> &ApplicationId {
        self.ticket.target()
    }
}

/// Result of [`Navigator::begin`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A fetch was issued; resolve it and hand it to [`Navigator::complete`]
    Fetch(PendingFetch),
    /// The command was applied without a fetch
    Applied,
    /// The command did not apply and nothing changed
    Ignored,
}

/// Result of [`Navigator::complete`]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The transition was applied; this is the new view
    Applied(ViewState),
    /// The fetch failed; state is unchanged
    Failed(Report),
    /// The fetch was superseded and its response dropped
    Discarded,
}

/// The navigation state machine
#[derive(Debug)]
pub struct Navigator {
    fetcher: Arc<Fetcher>,
    layout: LayoutConfig,
    lookahead: bool,
    state: NavigatorState,
    graph: SupplyChainGraph,
    history: NavigationHistory,
    details: Option<ApplicationDetails>,
}

impl Navigator {
    /// Create an idle navigator with the default layout and no lookahead.
    pub fn new(source: Arc<dyn SupplyChainSource>) -> Self {
        Self {
            fetcher: Arc::new(Fetcher::new(source)),
            layout: LayoutConfig::default(),
            lookahead: false,
            state: NavigatorState::Idle,
            graph: SupplyChainGraph::default(),
            history: NavigationHistory::new(),
            details: None,
        }
    }

    /// Create an idle navigator using the layout and lookahead setting of `config`.
    pub fn from_config(source: Arc<dyn SupplyChainSource>, config: &NavigatorConfig) -> Self {
        Self::new(source)
            .with_layout(config.layout)
            .with_lookahead(config.lookahead)
    }

    /// Use a different layout
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Enable or disable dead-end lookahead
    #[must_use]
    pub fn with_lookahead(mut self, lookahead: bool) -> Self {
        self.lookahead = lookahead;
        self
    }

    /// Current state
    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    /// Current breadcrumb trail
    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    /// Current graph
    pub fn graph(&self) -> &SupplyChainGraph {
        &self.graph
    }

    /// Snapshot of everything the presentation layer renders
    pub fn view(&self) -> ViewState {
        ViewState {
            nodes: self.graph.nodes.clone(),
            edges: self.graph.edges.clone(),
            history: self.history.entries().to_vec(),
            center_app_id: self.state.center().cloned(),
            center_details: self.details.clone(),
        }
    }

    /// Decide how to handle `command`.
    pub fn begin(&mut self, command: Command) -> Step {
        match command {
            Command::Select(id) => self.begin_select(id),
            Command::ClickNode(id) => self.begin_click_node(&id),
            Command::ClickBreadcrumb(index) => self.begin_breadcrumb(index),
            Command::Clear => {
                self.fetcher.invalidate();
                self.state = NavigatorState::Idle;
                self.graph = SupplyChainGraph::default();
                self.history.reset();
                self.details = None;
                info!("Selection cleared");
                Step::Applied
            }
        }
    }

    fn begin_select(&mut self, id: ApplicationId) -> Step {
        if id.is_empty() {
            debug!("Ignoring selection without an id");
            return Step::Ignored;
        }
        if self.is_center(&id) {
            // Still supersede anything in flight: the user's latest choice is this one.
            self.fetcher.invalidate();
            debug!(app_id = %id, "Already centered");
            return Step::Ignored;
        }
        self.issue(id, HistoryUpdate::Reset)
    }

    fn begin_click_node(&mut self, id: &ApplicationId) -> Step {
        if self.is_center(id) {
            debug!(app_id = %id, "Clicked the centered node");
            return Step::Ignored;
        }
        match self.graph.node(id) {
            Some(node) if node.clickable => self.issue(id.clone(), HistoryUpdate::Advance),
            Some(_) => {
                debug!(app_id = %id, "Node is not clickable");
                Step::Ignored
            }
            None => {
                debug!(app_id = %id, "Clicked id is not in the graph");
                Step::Ignored
            }
        }
    }

    fn begin_breadcrumb(&mut self, index: usize) -> Step {
        let Some(entry) = self.history.get(index) else {
            debug!(index, len = self.history.len(), "Breadcrumb out of range");
            return Step::Ignored;
        };
        let id = entry.id.clone();
        if self.is_center(&id) {
            self.fetcher.invalidate();
            debug!(app_id = %id, "Breadcrumb is the current center");
            return Step::Ignored;
        }
        self.issue(id, HistoryUpdate::TruncateTo(index))
    }

    fn issue(&self, id: ApplicationId, update: HistoryUpdate) -> Step {
        let ticket = self.fetcher.issue(id);
        Step::Fetch(PendingFetch { ticket, update })
    }

    fn is_center(&self, id: &ApplicationId) -> bool {
        self.state.center() == Some(id)
    }

    /// A future resolving `pending` against the source. It does not borrow
    /// the navigator.
    pub fn resolve(
        &self,
        pending: PendingFetch,
    ) -> impl Future<Output = (PendingFetch, Result<Fetched>)> + Send + use<> {
        let fetcher = Arc::clone(&self.fetcher);
        let lookahead = self.lookahead;
        async move {
            let result = fetcher.fetch(&pending.ticket, lookahead).await;
            (pending, result)
        }
    }

    /// Apply a resolved fetch, if it is still the latest one.
    pub fn complete(&mut self, pending: PendingFetch, result: Result<Fetched>) -> Outcome {
        let target = pending.ticket.target().clone();
        if !self.fetcher.is_current(&pending.ticket) {
            debug!(app_id = %target, seq = pending.ticket.seq(), "Discarding superseded response");
            return Outcome::Discarded;
        }

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => return self.fail(&target, &e),
        };

        let snapshot = fetched.snapshot;
        let graph = graph::build_with_dead_ends(&snapshot, &self.layout, &fetched.dead_ends);
        let entry = HistoryEntry::new(target.clone(), snapshot.main_app.name.clone());

        let mut history = self.history.clone();
        match pending.update {
            HistoryUpdate::Reset => history = NavigationHistory::starting_at(entry),
            HistoryUpdate::Advance => history.advance(entry),
            HistoryUpdate::TruncateTo(index) => {
                history.truncate_to(index);
            }
        }

        self.graph = graph;
        self.history = history;
        self.details = snapshot.main_details;
        self.state = NavigatorState::Viewing {
            center: target.clone(),
        };
        info!(
            app_id = %target,
            nodes = self.graph.nodes.len(),
            depth = self.history.len(),
            "Centered application"
        );
        Outcome::Applied(self.view())
    }

    fn fail(&self, target: &ApplicationId, error: &Error) -> Outcome {
        match error.severity() {
            None => {
                debug!(app_id = %target, "Fetch superseded in flight");
                Outcome::Discarded
            }
            Some(severity) => {
                tracing::warn!(app_id = %target, error = %error, "Fetch failed, keeping current view");
                Outcome::Failed(Report {
                    message: format!("Failed to load supply chain for {target}: {error}"),
                    severity,
                })
            }
        }
    }

    /// Handle `command` end to end: decide, fetch, apply.
    ///
    /// Returns `None` when the command applied without a fetch or was ignored.
    pub async fn dispatch(&mut self, command: Command) -> Option<Outcome> {
        match self.begin(command) {
            Step::Fetch(pending) => {
                let (pending, result) = self.resolve(pending).await;
                Some(self.complete(pending, result))
            }
            Step::Applied | Step::Ignored => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Application, ApplicationRecord, SupplyChainSnapshot};
    use crate::source::InMemorySource;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts fetches and fails on demand for ids listed as broken
    struct CountingSource {
        inner: InMemorySource,
        fetches: AtomicUsize,
        broken: HashSet<ApplicationId>,
    }

    #[async_trait]
    impl SupplyChainSource for CountingSource {
        async fn fetch_supply_chain(&self, id: &ApplicationId) -> Result<SupplyChainSnapshot> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.broken.contains(id) {
                return Err(Error::Transient("backend timeout".to_string()));
            }
            self.inner.fetch_supply_chain(id).await
        }

        async fn list_applications(&self) -> Result<Vec<Application>> {
            self.inner.list_applications().await
        }
    }

    /// a -> b -> c -> d, b -> x, with "broken" reachable from a
    async fn chain_source(broken: &[&str]) -> Arc<CountingSource> {
        let inner = InMemorySource::new();
        inner
            .register(
                ApplicationRecord::new("a", "A")
                    .with_downstream("b", "B")
                    .with_downstream("broken", "Broken"),
            )
            .await;
        inner
            .register(
                ApplicationRecord::new("b", "B")
                    .with_downstream("c", "C")
                    .with_downstream("x", "X"),
            )
            .await;
        inner
            .register(ApplicationRecord::new("c", "C").with_downstream("d", "D"))
            .await;
        Arc::new(CountingSource {
            inner,
            fetches: AtomicUsize::new(0),
            broken: broken.iter().map(|id| ApplicationId::new(*id)).collect(),
        })
    }

    fn trail(navigator: &Navigator) -> Vec<&str> {
        navigator
            .history()
            .entries()
            .iter()
            .map(|e| e.id.as_str())
            .collect()
    }

    fn select(id: &str) -> Command {
        Command::Select(ApplicationId::new(id))
    }

    fn click(id: &str) -> Command {
        Command::ClickNode(ApplicationId::new(id))
    }

    #[tokio::test]
    async fn select_from_idle_centers_and_starts_trail() {
        let source = chain_source(&[]).await;
        let mut navigator = Navigator::new(source);

        let outcome = navigator.dispatch(select("b")).await;

        let Some(Outcome::Applied(view)) = outcome else {
            panic!("expected applied outcome, got {outcome:?}");
        };
        assert_eq!(view.center_app_id, Some(ApplicationId::new("b")));
        assert_eq!(view.nodes.len(), 4);
        assert_eq!(view.edges.len(), 3);
        assert_eq!(trail(&navigator), vec!["b"]);
    }

    #[tokio::test]
    async fn clicking_through_and_breadcrumb_back() {
        let source = chain_source(&[]).await;
        let mut navigator = Navigator::new(source.clone());

        navigator.dispatch(select("a")).await;
        navigator.dispatch(click("b")).await;
        navigator.dispatch(click("c")).await;
        assert_eq!(trail(&navigator), vec!["a", "b", "c"]);

        let before = source.fetches.load(Ordering::SeqCst);
        let outcome = navigator.dispatch(Command::ClickBreadcrumb(0)).await;

        assert!(matches!(outcome, Some(Outcome::Applied(_))));
        assert_eq!(source.fetches.load(Ordering::SeqCst), before + 1);
        assert_eq!(trail(&navigator), vec!["a"]);
        assert_eq!(navigator.state().center(), Some(&ApplicationId::new("a")));
    }

    #[tokio::test]
    async fn clicking_an_earlier_trail_entry_truncates() {
        let source = chain_source(&[]).await;
        let mut navigator = Navigator::new(source);

        navigator.dispatch(select("a")).await;
        navigator.dispatch(click("b")).await;
        navigator.dispatch(click("c")).await;
        navigator.dispatch(click("b")).await;

        assert_eq!(trail(&navigator), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn select_resets_trail() {
        let source = chain_source(&[]).await;
        let mut navigator = Navigator::new(source);

        navigator.dispatch(select("a")).await;
        navigator.dispatch(click("b")).await;
        navigator.dispatch(select("c")).await;

        assert_eq!(trail(&navigator), vec!["c"]);
    }

    #[tokio::test]
    async fn non_clickable_or_unknown_click_issues_no_fetch() {
        let source = chain_source(&[]).await;
        let mut navigator = Navigator::new(source.clone()).with_lookahead(true);

        navigator.dispatch(select("b")).await;
        let x = navigator.graph().node(&ApplicationId::new("x")).unwrap();
        assert!(!x.clickable);
        let before_view = navigator.view();
        let before = source.fetches.load(Ordering::SeqCst);

        assert_eq!(navigator.begin(click("x")), Step::Ignored);
        assert_eq!(navigator.begin(click("nowhere")), Step::Ignored);
        assert_eq!(navigator.begin(click("b")), Step::Ignored);

        assert_eq!(source.fetches.load(Ordering::SeqCst), before);
        assert_eq!(navigator.view(), before_view);
    }

    #[tokio::test]
    async fn breadcrumb_on_center_or_out_of_range_is_ignored() {
        let source = chain_source(&[]).await;
        let mut navigator = Navigator::new(source);
        navigator.dispatch(select("a")).await;
        navigator.dispatch(click("b")).await;

        assert_eq!(navigator.begin(Command::ClickBreadcrumb(1)), Step::Ignored);
        assert_eq!(navigator.begin(Command::ClickBreadcrumb(5)), Step::Ignored);
        assert_eq!(trail(&navigator), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn selecting_the_center_again_is_a_no_op() {
        let source = chain_source(&[]).await;
        let mut navigator = Navigator::new(source.clone());
        navigator.dispatch(select("a")).await;
        navigator.dispatch(click("b")).await;

        assert_eq!(navigator.begin(select("b")), Step::Ignored);
        assert_eq!(trail(&navigator), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn failure_keeps_previous_view_and_reports() {
        let source = chain_source(&["broken"]).await;
        let mut navigator = Navigator::new(source);
        navigator.dispatch(select("a")).await;
        let before = navigator.view();

        let outcome = navigator.dispatch(click("broken")).await;

        let Some(Outcome::Failed(report)) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(report.severity, Severity::Error);
        assert!(report.message.contains("broken"));
        assert_eq!(navigator.view(), before);
    }

    #[tokio::test]
    async fn unknown_selection_reports_warning_and_stays_idle() {
        let source = chain_source(&[]).await;
        let mut navigator = Navigator::new(source);

        let outcome = navigator.dispatch(select("ghost")).await;

        assert!(matches!(
            outcome,
            Some(Outcome::Failed(Report { severity: Severity::Warning, .. }))
        ));
        assert_eq!(navigator.state(), &NavigatorState::Idle);
        assert!(navigator.view().is_idle());
    }

    #[tokio::test]
    async fn clear_returns_to_idle_and_drops_in_flight_fetch() {
        let source = chain_source(&[]).await;
        let mut navigator = Navigator::new(source);
        navigator.dispatch(select("a")).await;

        let Step::Fetch(pending) = navigator.begin(click("b")) else {
            panic!("expected a fetch");
        };
        assert_eq!(navigator.begin(Command::Clear), Step::Applied);
        let (pending, result) = navigator.resolve(pending).await;

        assert_eq!(navigator.complete(pending, result), Outcome::Discarded);
        assert_eq!(navigator.view(), ViewState::default());
    }

    #[tokio::test]
    async fn latest_request_wins_in_either_arrival_order() {
        for newest_first in [false, true] {
            let source = chain_source(&[]).await;
            let mut navigator = Navigator::new(source.clone());

            let Step::Fetch(first) = navigator.begin(select("a")) else {
                panic!("expected a fetch");
            };
            let Step::Fetch(second) = navigator.begin(select("c")) else {
                panic!("expected a fetch");
            };
            // Resolve the first one straight from the source, as if it had
            // slipped past the fetcher's own check.
            let stale = Fetched {
                snapshot: source.fetch_supply_chain(first.target()).await.unwrap(),
                dead_ends: HashSet::new(),
            };
            let (second, fresh) = navigator.resolve(second).await;

            if newest_first {
                assert!(matches!(navigator.complete(second, fresh), Outcome::Applied(_)));
                assert_eq!(navigator.complete(first, Ok(stale)), Outcome::Discarded);
            } else {
                assert_eq!(navigator.complete(first, Ok(stale)), Outcome::Discarded);
                assert!(matches!(navigator.complete(second, fresh), Outcome::Applied(_)));
            }

            assert_eq!(navigator.state().center(), Some(&ApplicationId::new("c")));
            assert_eq!(trail(&navigator), vec!["c"]);
        }
    }

    #[tokio::test]
    async fn view_carries_center_details() {
        let inner = InMemorySource::new();
        let mut record = ApplicationRecord::new("pay", "Payments");
        record.details.api_name = Some("PayAPI".to_string());
        inner.register(record).await;
        let mut navigator = Navigator::new(Arc::new(inner));

        navigator.dispatch(select("pay")).await;

        let details = navigator.view().center_details.unwrap();
        assert_eq!(details.api_name.as_deref(), Some("PayAPI"));
    }

    #[tokio::test]
    async fn custom_layout_is_used() {
        let source = chain_source(&[]).await;
        let layout = LayoutConfig {
            center_x: 0.0,
            center_y: 0.0,
            ..LayoutConfig::default()
        };
        let mut navigator = Navigator::new(source).with_layout(layout);

        navigator.dispatch(select("c")).await;

        let main = navigator.graph().main_node().unwrap();
        assert_eq!((main.position.x, main.position.y), (0.0, 0.0));
    }
}
