//! Application context for CLI command execution.
//!
//! This module provides the `App` struct that loads configuration, opens
//! the persistent stores, and wires the caching layer over the history
//! backing store.
//!
//! # Example
//!
//! ```no_run
//! use girder::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     // Execute commands using app...
//!     Ok(())
//! }
//! ```

use crate::commands::init::find_girder_root;
use crate::config::{GirderConfig, CONFIG_FILE_NAME, GIRDER_DIR_NAME};
use crate::error::{Error, Result};
use crate::filter::JsonlFilterStore;
use crate::history::{CachingHistoryStore, JsonlHistoryStore};
use crate::messages::MessageSet;
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
///
/// Holds the caching history store over its JSONL backing store, the
/// filter store, and the loaded configuration. Data files whose locations
/// the config gives as relative paths are resolved against the girder
/// root.
pub struct App {
    history: CachingHistoryStore,
    filters: JsonlFilterStore,
    config: GirderConfig,
    girder_dir: PathBuf,
    load_warnings: MessageSet,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("girder_dir", &self.girder_dir)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree to find a `.girder/` directory,
    /// loads configuration, and opens the stores. Corrupt data file lines
    /// are logged and skipped rather than failing the load.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No girder directory is found in the directory tree
    /// - Configuration cannot be loaded
    /// - A data file exists but cannot be read
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_girder_root(working_dir).ok_or(Error::NotInitialized)?;

        let girder_dir = root_dir.join(GIRDER_DIR_NAME);
        let config_path = girder_dir.join(CONFIG_FILE_NAME);

        let config = GirderConfig::load(&config_path).await?;

        let mut load_warnings = MessageSet::new();

        let history_path = root_dir.join(&config.storage.history_file);
        let (store, warnings) = JsonlHistoryStore::open(&history_path).await?;
        for warning in &warnings {
            tracing::warn!(file = %history_path.display(), %warning, "Skipped history row");
            load_warnings.add_warning_message(format!(
                "skipped history row in {}: {warning}",
                history_path.display()
            ));
        }
        let history = CachingHistoryStore::new(Box::new(store), config.history.clone());

        let filters_path = root_dir.join(&config.storage.filters_file);
        let (filters, filter_warnings) = JsonlFilterStore::open(&filters_path).await?;
        for warning in &filter_warnings {
            tracing::warn!(file = %filters_path.display(), %warning, "Skipped filter row");
            load_warnings.add_warning_message(format!(
                "skipped filter row in {}: {warning}",
                filters_path.display()
            ));
        }

        Ok(Self {
            history,
            filters,
            config,
            girder_dir,
            load_warnings,
        })
    }

    /// Get a mutable reference to the history store.
    pub fn history_mut(&mut self) -> &mut CachingHistoryStore {
        &mut self.history
    }

    /// Get an immutable reference to the history store.
    pub fn history(&self) -> &CachingHistoryStore {
        &self.history
    }

    /// Get a mutable reference to the filter store.
    pub fn filters_mut(&mut self) -> &mut JsonlFilterStore {
        &mut self.filters
    }

    /// Get an immutable reference to the filter store.
    pub fn filters(&self) -> &JsonlFilterStore {
        &self.filters
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &GirderConfig {
        &self.config
    }

    /// Get the path to the girder directory.
    pub fn girder_dir(&self) -> &Path {
        &self.girder_dir
    }

    /// Warnings accumulated while loading the data files (skipped corrupt
    /// or invalid rows). Empty when both files loaded cleanly.
    pub fn load_warnings(&self) -> &MessageSet {
        &self.load_warnings
    }
}
