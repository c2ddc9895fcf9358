//! Color and styling helpers for CLI output.
//!
//! Role colors:
//!   - Upstream:   green
//!   - Main:       blue, bold
//!   - Downstream: yellow
//!
//! Reports are yellow (warning) or red (error). Field labels and
//! coordinates are dimmed.

use crate::error::Severity;
use crate::graph::NodeRole;
use colored::Colorize;

use super::OutputConfig;

/// Color text by the role of the node it describes.
pub(crate) fn colorize_role(text: &str, role: NodeRole, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    match role {
        NodeRole::Upstream => text.green().to_string(),
        NodeRole::Main => text.blue().bold().to_string(),
        NodeRole::Downstream => text.yellow().to_string(),
    }
}

/// Color a report label by severity.
pub(crate) fn colorize_severity(severity: Severity, config: &OutputConfig) -> String {
    let text = severity.to_string();
    if !config.use_colors {
        return text;
    }
    match severity {
        Severity::Warning => text.yellow().bold().to_string(),
        Severity::Error => text.red().bold().to_string(),
    }
}

/// Arrow marking a node's role
pub(crate) fn role_marker(role: NodeRole) -> &'static str {
    match role {
        NodeRole::Upstream => "^",
        NodeRole::Main => "*",
        NodeRole::Downstream => "v",
    }
}

/// Apply dimmed style to text (for labels and coordinates).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
