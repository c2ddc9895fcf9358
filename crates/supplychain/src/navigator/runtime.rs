//! Channel-driven runtime for a [`Navigator`].
//!
//! Commands come in over an `mpsc` channel. Every issued fetch runs as its
//! own future inside a `FuturesUnordered` set, so a slow fetch never blocks
//! newer commands. Accepted views are published on a `watch` channel and
//! failures go out as [`Report`]s.
//!
//! [`CommandSender::send`] fires a command and moves on; a newer command may
//! supersede it. [`CommandSender::dispatch`] waits until the command has
//! settled, so a caller that dispatches one command at a time sees every
//! command act on the view left by the previous one.
//!
//! When every command sender is gone the runtime stops taking commands,
//! lets the fetches already in flight settle, and returns.

use super::{Command, Navigator, Outcome, Report, Step, ViewState};
use crate::error::{Error, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

/// Capacity of the command channel
const COMMAND_BUFFER: usize = 32;

/// How a command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// A new view was published
    Applied,
    /// The fetch failed and a report was sent
    Failed,
    /// A newer command superseded the fetch
    Discarded,
    /// The command did not apply
    Ignored,
}

#[derive(Debug)]
struct Request {
    command: Command,
    ack: Option<oneshot::Sender<Settled>>,
}

/// The task side: owns the navigator and the channel ends it serves.
#[derive(Debug)]
pub struct NavigatorRuntime {
    navigator: Navigator,
    commands: mpsc::Receiver<Request>,
    views: watch::Sender<ViewState>,
    reports: mpsc::UnboundedSender<Report>,
}

/// Sends commands to a running [`NavigatorRuntime`].
#[derive(Debug, Clone)]
pub struct CommandSender {
    requests: mpsc::Sender<Request>,
}

/// The caller side: sends commands, observes views and reports.
#[derive(Debug)]
pub struct NavigatorHandle {
    commands: CommandSender,
    views: watch::Receiver<ViewState>,
    reports: mpsc::UnboundedReceiver<Report>,
}

impl NavigatorRuntime {
    /// Wrap `navigator` and create the handle that talks to it.
    pub fn new(navigator: Navigator) -> (Self, NavigatorHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (view_tx, view_rx) = watch::channel(navigator.view());
        let (report_tx, report_rx) = mpsc::unbounded_channel();

        let runtime = Self {
            navigator,
            commands: command_rx,
            views: view_tx,
            reports: report_tx,
        };
        let handle = NavigatorHandle {
            commands: CommandSender {
                requests: command_tx,
            },
            views: view_rx,
            reports: report_rx,
        };
        (runtime, handle)
    }

    /// Serve commands until every handle is dropped, then drain in-flight
    /// fetches. Returns the navigator in its final state.
    pub async fn run(mut self) -> Navigator {
        let mut in_flight = FuturesUnordered::new();

        loop {
            tokio::select! {
                request = self.commands.recv() => {
                    let Some(Request { command, ack }) = request else { break };
                    match self.navigator.begin(command) {
                        Step::Fetch(pending) => {
                            let resolving = self.navigator.resolve(pending);
                            in_flight.push(async move {
                                let (pending, result) = resolving.await;
                                (pending, result, ack)
                            });
                        }
                        Step::Applied => {
                            self.publish();
                            acknowledge(ack, Settled::Applied);
                        }
                        Step::Ignored => acknowledge(ack, Settled::Ignored),
                    }
                }
                Some((pending, result, ack)) = in_flight.next(), if !in_flight.is_empty() => {
                    let outcome = self.navigator.complete(pending, result);
                    acknowledge(ack, self.deliver(outcome));
                }
            }
        }

        debug!(remaining = in_flight.len(), "Command channel closed, draining fetches");
        while let Some((pending, result, ack)) = in_flight.next().await {
            let outcome = self.navigator.complete(pending, result);
            acknowledge(ack, self.deliver(outcome));
        }
        self.navigator
    }

    fn deliver(&self, outcome: Outcome) -> Settled {
        match outcome {
            Outcome::Applied(view) => {
                self.views.send_replace(view);
                Settled::Applied
            }
            Outcome::Failed(report) => {
                if self.reports.send(report).is_err() {
                    debug!("No report receiver");
                }
                Settled::Failed
            }
            Outcome::Discarded => Settled::Discarded,
        }
    }

    fn publish(&self) {
        self.views.send_replace(self.navigator.view());
    }
}

fn acknowledge(ack: Option<oneshot::Sender<Settled>>, settled: Settled) {
    if let Some(ack) = ack {
        // The dispatcher may have given up waiting.
        let _ = ack.send(settled);
    }
}

impl CommandSender {
    /// Send a command without waiting for it to settle.
    ///
    /// # Errors
    ///
    /// Returns `Error::Disconnected` if the runtime has stopped.
    pub async fn send(&self, command: Command) -> Result<()> {
        self.requests
            .send(Request { command, ack: None })
            .await
            .map_err(|_| Error::Disconnected)
    }

    /// Send a command and wait until it has settled: its view is published,
    /// its report is sent, or it was ignored or superseded.
    ///
    /// # Errors
    ///
    /// Returns `Error::Disconnected` if the runtime has stopped.
    pub async fn dispatch(&self, command: Command) -> Result<Settled> {
        let (ack, settled) = oneshot::channel();
        self.requests
            .send(Request {
                command,
                ack: Some(ack),
            })
            .await
            .map_err(|_| Error::Disconnected)?;
        settled.await.map_err(|_| Error::Disconnected)
    }
}

impl NavigatorHandle {
    /// Send a command without waiting for it to settle.
    ///
    /// # Errors
    ///
    /// Returns `Error::Disconnected` if the runtime has stopped.
    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).await
    }

    /// Send a command and wait until it has settled.
    ///
    /// # Errors
    ///
    /// Returns `Error::Disconnected` if the runtime has stopped.
    pub async fn dispatch(&self, command: Command) -> Result<Settled> {
        self.commands.dispatch(command).await
    }

    /// The most recently published view
    pub fn current_view(&self) -> ViewState {
        self.views.borrow().clone()
    }

    /// A receiver that observes every published view
    pub fn views(&self) -> watch::Receiver<ViewState> {
        self.views.clone()
    }

    /// Wait for the next report; `None` once the runtime has stopped.
    pub async fn next_report(&mut self) -> Option<Report> {
        self.reports.recv().await
    }

    /// Split into the command sender, view receiver and report receiver.
    pub fn into_parts(
        self,
    ) -> (
        CommandSender,
        watch::Receiver<ViewState>,
        mpsc::UnboundedReceiver<Report>,
    ) {
        (self.commands, self.views, self.reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ApplicationId;
    use crate::error::Severity;
    use crate::source::{MockSource, MOCK_APPLICATION_ID};
    use std::sync::Arc;

    #[tokio::test]
    async fn publishes_views_and_reports() {
        let (runtime, handle) = NavigatorRuntime::new(Navigator::new(Arc::new(MockSource::new())));
        let task = tokio::spawn(runtime.run());
        let (commands, views, mut reports) = handle.into_parts();

        commands
            .send(Command::Select(ApplicationId::new("missing")))
            .await
            .unwrap();
        let report = reports.recv().await.unwrap();
        assert_eq!(report.severity, Severity::Warning);

        commands
            .send(Command::Select(ApplicationId::new(MOCK_APPLICATION_ID)))
            .await
            .unwrap();
        drop(commands);

        let navigator = task.await.unwrap();

        assert_eq!(
            views.borrow().center_app_id,
            Some(ApplicationId::new(MOCK_APPLICATION_ID))
        );
        assert_eq!(navigator.history().len(), 1);
    }

    #[tokio::test]
    async fn clear_publishes_idle_view() {
        let (runtime, handle) = NavigatorRuntime::new(Navigator::new(Arc::new(MockSource::new())));
        let task = tokio::spawn(runtime.run());

        handle
            .send(Command::Select(ApplicationId::new(MOCK_APPLICATION_ID)))
            .await
            .unwrap();
        handle.send(Command::Clear).await.unwrap();
        let views = handle.views();
        drop(handle);
        task.await.unwrap();

        assert!(views.borrow().is_idle());
    }

    #[tokio::test]
    async fn send_after_stop_is_disconnected() {
        let (runtime, handle) = NavigatorRuntime::new(Navigator::new(Arc::new(MockSource::new())));
        drop(runtime);

        let result = handle.send(Command::Clear).await;
        assert!(matches!(result, Err(Error::Disconnected)));
    }

    #[tokio::test]
    async fn dispatch_waits_for_the_view() {
        let (runtime, handle) = NavigatorRuntime::new(Navigator::new(Arc::new(MockSource::new())));
        let task = tokio::spawn(runtime.run());

        let settled = handle
            .dispatch(Command::Select(ApplicationId::new(MOCK_APPLICATION_ID)))
            .await
            .unwrap();

        assert_eq!(settled, Settled::Applied);
        assert_eq!(
            handle.current_view().center_app_id,
            Some(ApplicationId::new(MOCK_APPLICATION_ID))
        );
        assert_eq!(
            handle.dispatch(Command::ClickBreadcrumb(5)).await.unwrap(),
            Settled::Ignored
        );
        assert_eq!(
            handle
                .dispatch(Command::Select(ApplicationId::new("missing")))
                .await
                .unwrap(),
            Settled::Failed
        );

        drop(handle);
        task.await.unwrap();
    }
}
