//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for girder using clap's
//! derive API.
//!
//! # Commands
//!
//! - `init`: Initialize a new girder directory
//! - `add`: Record a viewed entity in a user's history
//! - `recent`: List a user's recent items for a category
//! - `clear`: Clear all history for a user
//! - `filter`: Manage user-picker filters
//! - `inspect`: Summarize a backup export file
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! girder add alice issue PROJ-42
//! girder recent alice issue --limit 10
//! girder filter set assignee-picker --group developers --role 10001
//! girder inspect backup.json
//! ```

mod execute;

use crate::domain::HistoryCategory;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

fn parse_category(s: &str) -> std::result::Result<HistoryCategory, String> {
    s.parse()
}

/// Girder - bounded per-user history tracking
///
/// Records recently viewed entities per user and category with a
/// configurable cap, stored in `.girder/history.jsonl`.
#[derive(Parser, Debug)]
#[command(name = "girder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new girder directory
    ///
    /// Creates the `.girder/` directory with configuration and empty data
    /// files. Run this once in your project root.
    Init(InitArgs),

    /// Record a viewed entity in a user's history
    ///
    /// Re-recording an entity moves it to the front of the list instead of
    /// adding a duplicate. The list is trimmed to the configured cap.
    Add(AddArgs),

    /// List a user's recent items for a category
    ///
    /// Items are shown most recently viewed first.
    Recent(RecentArgs),

    /// Clear all history for a user
    ///
    /// Removes the user's items across every category and reports which
    /// categories actually had data.
    Clear(ClearArgs),

    /// Manage user-picker filters
    ///
    /// Set, show, list, or remove the group/role restrictions applied to a
    /// picker field.
    Filter(FilterArgs),

    /// Summarize a backup export file
    ///
    /// Shows exported projects, issue counts, and a SHA-256 digest of the
    /// file.
    Inspect(InspectArgs),
}

/// Arguments for the `init` command
#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Default cap on items kept per (user, category)
    #[arg(long)]
    pub max_items: Option<usize>,

    /// Suppress output on success
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `add` command
#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// User key owning the history entry
    pub user: String,

    /// History category (issue, project, jql_query, dashboard, assignee)
    #[arg(value_parser = parse_category)]
    pub category: HistoryCategory,

    /// Identifier of the viewed entity (issue key, project key, ...)
    pub entity_id: String,

    /// Optional payload to store with the entry, e.g. the query text
    #[arg(long)]
    pub data: Option<String>,
}

/// Arguments for the `recent` command
#[derive(Args, Debug, Clone)]
pub struct RecentArgs {
    /// User key to list history for
    pub user: String,

    /// History category (issue, project, jql_query, dashboard, assignee)
    #[arg(value_parser = parse_category)]
    pub category: HistoryCategory,

    /// Maximum number of items to show
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Arguments for the `clear` command
#[derive(Args, Debug, Clone)]
pub struct ClearArgs {
    /// User key whose history is cleared
    pub user: String,
}

/// Arguments for the `filter` command
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Filter action to perform
    #[command(subcommand)]
    pub action: FilterAction,
}

/// Actions on user-picker filters
#[derive(Subcommand, Debug, Clone)]
pub enum FilterAction {
    /// Set the filter for a picker field
    Set {
        /// Picker field id, e.g. assignee-picker
        field_id: String,

        /// Allowed group name (repeatable)
        #[arg(long = "group")]
        groups: Vec<String>,

        /// Allowed project role id (repeatable)
        #[arg(long = "role")]
        roles: Vec<u64>,

        /// Store the filter disabled (no restriction applied)
        #[arg(long)]
        disabled: bool,
    },

    /// Show the filter for a picker field
    Show {
        /// Picker field id
        field_id: String,
    },

    /// List all stored filters
    List,

    /// Remove the filter for a picker field
    Remove {
        /// Picker field id
        field_id: String,
    },
}

/// Arguments for the `inspect` command
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Path to the backup export file
    pub path: PathBuf,
}

/// Opens the application context for the current directory, surfacing any
/// data-file load warnings (skipped corrupt rows) before the command runs.
///
/// Warnings are only printed in text mode; in JSON mode stdout has to stay
/// machine-parseable, and the warnings are already on stderr via tracing.
async fn open_app(output_mode: crate::output::OutputMode) -> Result<crate::app::App> {
    let app = crate::app::App::from_directory(&std::env::current_dir()?).await?;
    if matches!(output_mode, crate::output::OutputMode::Text) && app.load_warnings().has_warnings()
    {
        crate::output::print_message_set(app.load_warnings(), output_mode)?;
    }
    Ok(app)
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args, output_mode).await,
            Some(Commands::Add(args)) => {
                let mut app = open_app(output_mode).await?;
                execute::execute_add(&mut app, args, output_mode).await
            }
            Some(Commands::Recent(args)) => {
                let app = open_app(output_mode).await?;
                execute::execute_recent(&app, args, output_mode).await
            }
            Some(Commands::Clear(args)) => {
                let mut app = open_app(output_mode).await?;
                execute::execute_clear(&mut app, args, output_mode).await
            }
            Some(Commands::Filter(args)) => {
                let mut app = open_app(output_mode).await?;
                execute::execute_filter(&mut app, args, output_mode).await
            }
            Some(Commands::Inspect(args)) => execute::execute_inspect(args, output_mode).await,
            None => {
                println!("Girder history tracking");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
