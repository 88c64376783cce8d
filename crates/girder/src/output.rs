//! Output formatting for CLI commands.
//!
//! This module provides utilities for formatting command output in both
//! human-readable text format and JSON format for programmatic use.

use crate::domain::{HistoryCategory, UserHistoryItem};
use crate::import::BackupOverview;
use crate::messages::{ErrorCollection, MessageSet};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::env;
use std::io::{self, Write};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    pub fn new(max_width: usize, use_colors: bool) -> Self {
        Self {
            max_width,
            use_colors,
        }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `GIRDER_MAX_WIDTH`: Maximum content width (default: 80)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `GIRDER_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        let max_width = match env::var("GIRDER_MAX_WIDTH") {
            Ok(s) if !s.is_empty() => match s.parse() {
                Ok(width) => width,
                Err(_) => {
                    tracing::warn!(
                        env_var = "GIRDER_MAX_WIDTH",
                        value = %s,
                        default = DEFAULT_MAX_CONTENT_WIDTH,
                        "Invalid value, using default"
                    );
                    DEFAULT_MAX_CONTENT_WIDTH
                }
            },
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("GIRDER_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_colors,
        }
    }

    /// Effective line width: the smaller of the terminal and the cap.
    fn line_width(&self) -> usize {
        self.max_width.min(terminal_width())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_colors: true,
        }
    }
}

/// Get the current terminal width, falling back to default if detection fails.
fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH as usize)
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a user's recent items for one category.
pub fn print_history_items(
    category: HistoryCategory,
    items: &[UserHistoryItem],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_history_text(&mut handle, category, items, &config),
        OutputMode::Json => print_json_to(&mut handle, &items),
    }
}

/// Print the categories touched by a clear operation.
pub fn print_cleared_categories(
    cleared: &BTreeSet<HistoryCategory>,
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => {
            if cleared.is_empty() {
                writeln!(handle, "No history to clear")
            } else {
                let names: Vec<&str> = cleared.iter().map(HistoryCategory::as_str).collect();
                let line = format!("Cleared: {}", names.join(", "));
                if config.use_colors {
                    writeln!(handle, "{}", line.green())
                } else {
                    writeln!(handle, "{line}")
                }
            }
        }
        OutputMode::Json => {
            let names: Vec<&str> = cleared.iter().map(HistoryCategory::as_str).collect();
            print_json_to(&mut handle, &names)
        }
    }
}

/// Print a backup overview.
pub fn print_backup_overview(overview: &BackupOverview, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_overview_text(&mut handle, overview, &config),
        OutputMode::Json => print_json_to(&mut handle, overview),
    }
}

/// Print accumulated validation or load messages.
pub fn print_message_set(messages: &MessageSet, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => {
            for warning in messages.warning_messages() {
                if config.use_colors {
                    writeln!(handle, "{} {warning}", "warning:".yellow().bold())?;
                } else {
                    writeln!(handle, "warning: {warning}")?;
                }
            }
            for error in messages.error_messages() {
                if config.use_colors {
                    writeln!(handle, "{} {error}", "error:".red().bold())?;
                } else {
                    writeln!(handle, "error: {error}")?;
                }
            }
            Ok(())
        }
        OutputMode::Json => print_json_to(&mut handle, messages),
    }
}

/// Print field-keyed validation errors.
pub fn print_error_collection(errors: &ErrorCollection, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => {
            for (field, message) in errors.errors() {
                if config.use_colors {
                    writeln!(handle, "{} {field}: {message}", "error:".red().bold())?;
                } else {
                    writeln!(handle, "error: {field}: {message}")?;
                }
            }
            for message in errors.error_messages() {
                if config.use_colors {
                    writeln!(handle, "{} {message}", "error:".red().bold())?;
                } else {
                    writeln!(handle, "error: {message}")?;
                }
            }
            Ok(())
        }
        OutputMode::Json => print_json_to(&mut handle, errors),
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
    print_json_to(&mut handle, value)
}

fn print_json_to<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

fn print_history_text<W: Write>(
    w: &mut W,
    category: HistoryCategory,
    items: &[UserHistoryItem],
    config: &OutputConfig,
) -> io::Result<()> {
    if items.is_empty() {
        writeln!(w, "No recent {category} items")?;
        return Ok(());
    }

    let heading = format!("Recent {category} items ({})", items.len());
    if config.use_colors {
        writeln!(w, "{}", heading.bold())?;
    } else {
        writeln!(w, "{heading}")?;
    }

    let width = config.line_width();
    for item in items {
        let timestamp = item.last_viewed.format("%Y-%m-%d %H:%M");
        let line = if config.use_colors {
            format!(
                "  {}  {}",
                item.entity_id.cyan(),
                timestamp.to_string().dimmed()
            )
        } else {
            format!("  {}  {timestamp}", item.entity_id)
        };
        writeln!(w, "{line}")?;

        if let Some(data) = &item.data {
            for wrapped in textwrap::wrap(data, width.saturating_sub(4)) {
                writeln!(w, "    {wrapped}")?;
            }
        }
    }
    Ok(())
}

fn print_overview_text<W: Write>(
    w: &mut W,
    overview: &BackupOverview,
    config: &OutputConfig,
) -> io::Result<()> {
    let title = format!(
        "Backup (build {}, {} edition)",
        overview.system_information.build_number, overview.system_information.edition
    );
    if config.use_colors {
        writeln!(w, "{}", title.bold())?;
    } else {
        writeln!(w, "{title}")?;
    }
    writeln!(w, "digest: {}", overview.digest)?;
    writeln!(w)?;

    if overview.projects.is_empty() {
        writeln!(w, "No projects in backup")?;
        return Ok(());
    }

    let width = config.line_width();
    for project in &overview.projects {
        let heading = format!(
            "{} - {} ({} issues)",
            project.key,
            project.name,
            project.issue_count()
        );
        if config.use_colors {
            writeln!(w, "{}", heading.cyan())?;
        } else {
            writeln!(w, "{heading}")?;
        }
        if let Some(description) = &project.description {
            for line in textwrap::wrap(description, width.saturating_sub(2)) {
                writeln!(w, "  {line}")?;
            }
        }
    }
    Ok(())
}
