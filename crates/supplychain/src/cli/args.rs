//! CLI argument structs for all commands.

use clap::Parser;
use std::path::PathBuf;

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,

    /// Gray out neighbors that lead nowhere but back
    #[arg(long)]
    pub lookahead: bool,

    /// Path to the JSONL application records
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `list` command
#[derive(Parser, Debug, Clone, Default)]
pub struct ListArgs {}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Application ID to center on
    #[arg(value_parser = validate_app_id)]
    pub id: String,

    /// Look ahead at neighbors and mark dead ends, whatever the config says
    #[arg(long)]
    pub lookahead: bool,
}

/// Arguments for the `explore` command
#[derive(Parser, Debug, Clone)]
pub struct ExploreArgs {
    /// Application ID to select before reading gestures
    #[arg(value_parser = validate_app_id)]
    pub id: Option<String>,

    /// Look ahead at neighbors and mark dead ends, whatever the config says
    #[arg(long)]
    pub lookahead: bool,
}

/// Arguments for the `add` command
#[derive(Parser, Debug, Clone)]
pub struct AddArgs {
    /// Application ID
    #[arg(value_parser = validate_app_id)]
    pub id: String,

    /// Display name
    #[arg(short, long, value_parser = validate_app_name)]
    pub name: String,

    /// Business capability
    #[arg(short, long)]
    pub capability: Option<String>,

    /// Name of the API the application exposes
    #[arg(long)]
    pub api_name: Option<String>,

    /// API endpoint (derived from --api-name when omitted)
    #[arg(long)]
    pub api_endpoint: Option<String>,

    /// Upstream applications (comma-separated)
    ///
    /// Format: "id" for a known application, or "id=Name" to introduce one.
    #[arg(short, long, value_delimiter = ',', value_parser = parse_relation)]
    pub upstream: Vec<RelationArg>,

    /// Downstream applications (comma-separated, same format as --upstream)
    #[arg(short, long, value_delimiter = ',', value_parser = parse_relation)]
    pub downstream: Vec<RelationArg>,
}

/// Arguments for the `apis` command
#[derive(Parser, Debug, Clone)]
pub struct ApisArgs {
    /// Application ID
    #[arg(value_parser = validate_app_id)]
    pub id: String,
}

/// A relation given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationArg {
    /// Neighbor id
    pub id: String,
    /// Neighbor name, when given inline
    pub name: Option<String>,
}

/// Parse `id` or `id=Name`.
///
/// # Errors
///
/// Returns a message if the id or the inline name is invalid.
pub fn parse_relation(s: &str) -> Result<RelationArg, String> {
    match s.split_once('=') {
        Some((id, name)) => Ok(RelationArg {
            id: validate_app_id(id)?,
            name: Some(validate_app_name(name)?),
        }),
        None => Ok(RelationArg {
            id: validate_app_id(s)?,
            name: None,
        }),
    }
}

/// Validate an application display name.
///
/// # Errors
///
/// Returns a message if the name is blank.
pub fn validate_app_name(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Application name cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}

/// Validate an application ID argument.
///
/// # Errors
///
/// Returns a message if the ID is blank or contains whitespace.
pub fn validate_app_id(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Application ID cannot be empty".to_string());
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(format!("Application ID '{trimmed}' cannot contain whitespace"));
    }
    Ok(trimmed.to_string())
}
