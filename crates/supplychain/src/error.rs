//! Error types for supply-chain navigation.
//!
//! Errors fall into two groups:
//!
//! - **Fetch failures** (`NotFound`, `Transient`): abort the navigation step
//!   in progress and are reported to the operator. They are never fatal.
//! - **Bookkeeping** (`StaleResponse`): a superseded fetch resolved. The
//!   navigator drops it silently.
//!
//! Malformed neighbor entries are not errors at all; the graph builder
//! filters them out.

use crate::domain::ApplicationId;
use serde::Serialize;
use std::fmt;
use std::io;
use thiserror::Error;

/// The error type for supply-chain operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The application id does not resolve.
    #[error("Application not found: {0}")]
    NotFound(ApplicationId),

    /// I/O or backend failure while talking to the source.
    #[error("Source unavailable: {0}")]
    Transient(String),

    /// The response belongs to a fetch that has been superseded.
    #[error("Stale response for {target} (request {seq})")]
    StaleResponse {
        /// Target of the superseded fetch
        target: ApplicationId,
        /// Sequence number of the superseded fetch
        seq: u64,
    },

    /// The navigator runtime is no longer accepting commands.
    #[error("Navigator runtime has stopped")]
    Disconnected,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Severity the failure is reported with, or `None` for internal bookkeeping.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Error::NotFound(_) => Some(Severity::Warning),
            Error::StaleResponse { .. } => None,
            Error::Transient(_)
            | Error::Disconnected
            | Error::Config(_)
            | Error::Io(_)
            | Error::Json(_) => Some(Severity::Error),
        }
    }

    /// Whether this error is the superseded-fetch marker
    pub fn is_stale(&self) -> bool {
        matches!(self, Error::StaleResponse { .. })
    }
}

/// How loudly a failure should be shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Something the operator can fix by picking another application
    Warning,
    /// The source itself misbehaved; retrying may help
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A specialized Result type for supply-chain operations.
pub type Result<T> = std::result::Result<T, Error>;
