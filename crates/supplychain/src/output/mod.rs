//! Output formatting for CLI commands.
//!
//! Every printer comes in two modes: human-readable text and JSON for
//! programmatic use. Text printers take any `Write` so they can be tested
//! against a buffer.

mod color;

use crate::domain::{ApiSummary, Application, ApplicationId};
use crate::graph::{GraphNode, NodeRole};
use crate::navigator::{Report, ViewState};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

use color::{bold, colorize_role, colorize_severity, dimmed, role_marker};

/// Configuration for output formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an `OutputConfig` with explicit values.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Create an `OutputConfig` from the environment.
    ///
    /// Reads:
    /// - `NO_COLOR`: any value disables colors
    /// - `SUPPLYCHAIN_COLOR`: `0` or `false` disables colors
    pub fn from_env() -> Self {
        // https://no-color.org/
        let use_colors = env::var_os("NO_COLOR").is_none()
            && env::var("SUPPLYCHAIN_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);
        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Print the application directory in the specified format
pub fn print_applications(apps: &[Application], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_applications(&mut handle, apps, &OutputConfig::from_env())
        }
        OutputMode::Json => print_json(&apps),
    }
}

/// Print the APIs of one application in the specified format
pub fn print_apis(id: &ApplicationId, apis: &[ApiSummary], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_apis(&mut handle, id, apis, &OutputConfig::from_env())
        }
        OutputMode::Json => print_json(&apis),
    }
}

/// Print a view in the specified format
pub fn print_view(view: &ViewState, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_view(&mut handle, view, &OutputConfig::from_env())
        }
        OutputMode::Json => print_json_line(&serde_json::json!({ "view": view })),
    }
}

/// Print a report in the specified format. Text goes to stderr.
pub fn print_report(report: &Report, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            let stderr = io::stderr();
            let mut handle = stderr.lock();
            write_report(&mut handle, report, &OutputConfig::from_env())
        }
        OutputMode::Json => print_json_line(&serde_json::json!({ "report": report })),
    }
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{json}")
}

/// One compact JSON object per line, for streaming output
fn print_json_line<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json =
        serde_json::to_string(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

fn write_applications<W: Write>(
    w: &mut W,
    apps: &[Application],
    config: &OutputConfig,
) -> io::Result<()> {
    if apps.is_empty() {
        writeln!(w, "No applications found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} application(s):", apps.len())?;
    writeln!(w)?;
    let width = apps.iter().map(|a| a.id.as_str().len()).max().unwrap_or(0);
    for app in apps {
        writeln!(
            w,
            "  {}  {}",
            dimmed(&format!("{:<width$}", app.id.as_str()), config),
            app.name
        )?;
    }
    Ok(())
}

fn write_apis<W: Write>(
    w: &mut W,
    id: &ApplicationId,
    apis: &[ApiSummary],
    config: &OutputConfig,
) -> io::Result<()> {
    if apis.is_empty() {
        writeln!(w, "No APIs found for {id}.")?;
        return Ok(());
    }

    writeln!(w, "APIs of {}:", bold(id.as_str(), config))?;
    for api in apis {
        match &api.api_endpoint {
            Some(endpoint) => writeln!(w, "  {}  {}", api.api_name, dimmed(endpoint, config))?,
            None => writeln!(w, "  {}", api.api_name)?,
        }
    }
    Ok(())
}

fn write_view<W: Write>(w: &mut W, view: &ViewState, config: &OutputConfig) -> io::Result<()> {
    let Some(center) = &view.center_app_id else {
        writeln!(w, "Nothing selected.")?;
        return Ok(());
    };

    let trail: Vec<String> = view
        .history
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("[{i}] {}", entry.name))
        .collect();
    writeln!(w, "{} {}", dimmed("Trail:", config), trail.join(" > "))?;

    let main_label = view
        .nodes
        .iter()
        .find(|n| n.role == NodeRole::Main)
        .map_or(center.as_str(), |n| n.label.as_str());
    writeln!(
        w,
        "{} {} ({})",
        dimmed("Center:", config),
        colorize_role(main_label, NodeRole::Main, config),
        center
    )?;

    if let Some(details) = &view.center_details {
        let fields = [
            ("Capability:", &details.capability_name),
            ("API:", &details.api_name),
            ("Endpoint:", &details.api_endpoint),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                writeln!(w, "  {} {value}", dimmed(label, config))?;
            }
        }
    }

    write_row(w, "Upstream", NodeRole::Upstream, &view.nodes, config)?;
    write_row(w, "Downstream", NodeRole::Downstream, &view.nodes, config)?;
    Ok(())
}

fn write_row<W: Write>(
    w: &mut W,
    title: &str,
    role: NodeRole,
    nodes: &[GraphNode],
    config: &OutputConfig,
) -> io::Result<()> {
    let row: Vec<&GraphNode> = nodes.iter().filter(|n| n.role == role).collect();
    writeln!(w)?;
    writeln!(w, "{}", bold(&format!("{title} ({}):", row.len()), config))?;
    if row.is_empty() {
        writeln!(w, "  {}", dimmed("(none)", config))?;
        return Ok(());
    }
    for node in row {
        let suffix = if node.clickable { "" } else { "  [dead end]" };
        writeln!(
            w,
            "  {} {}  {}  {}{}",
            colorize_role(role_marker(role), role, config),
            colorize_role(node.id.as_str(), role, config),
            node.label,
            dimmed(
                &format!("({:.0}, {:.0})", node.position.x, node.position.y),
                config
            ),
            suffix
        )?;
    }
    Ok(())
}

fn write_report<W: Write>(w: &mut W, report: &Report, config: &OutputConfig) -> io::Result<()> {
    writeln!(
        w,
        "{}: {}",
        colorize_severity(report.severity, config),
        report.message
    )
}
