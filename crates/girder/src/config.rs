//! Configuration file structure for girder.
//!
//! The configuration lives at `.girder/config.yaml` and carries the
//! per-category history caps plus the data file locations.

use crate::domain::HistoryLimits;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Name of the girder directory
pub const GIRDER_DIR_NAME: &str = ".girder";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the history data file
pub const HISTORY_FILE_NAME: &str = "history.jsonl";

/// Name of the filters data file
pub const FILTERS_FILE_NAME: &str = "filters.jsonl";

/// Configuration file structure for girder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GirderConfig {
    /// Retention caps for history lists
    #[serde(default)]
    pub history: HistoryLimits,

    /// Storage configuration
    pub storage: StorageConfig,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Path to the history data file, relative to the girder root
    pub history_file: String,

    /// Path to the filters data file, relative to the girder root
    pub filters_file: String,
}

impl GirderConfig {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid YAML.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }
}

impl Default for GirderConfig {
    fn default() -> Self {
        Self {
            history: HistoryLimits::default(),
            storage: StorageConfig {
                history_file: format!("{GIRDER_DIR_NAME}/{HISTORY_FILE_NAME}"),
                filters_file: format!("{GIRDER_DIR_NAME}/{FILTERS_FILE_NAME}"),
            },
        }
    }
}
