//! Supply-chain navigator.
//!
//! Builds one-hop graphs of which applications feed into and consume a given
//! application, and navigates between them with a breadcrumb trail. The
//! crate ships both a library (source abstraction, graph builder, navigator
//! state machine) and a small CLI.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod config;
pub mod directory;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod graph;
pub mod history;
pub mod navigator;
pub mod source;

// Public CLI modules (needed by binary)
pub mod app;
pub mod cli;
pub mod output;
