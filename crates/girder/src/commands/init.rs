//! Implementation of the `init` command.
//!
//! This module handles initialization of a new girder directory, creating
//! the `.girder/` structure with configuration and empty data files.

use crate::config::{
    GirderConfig, CONFIG_FILE_NAME, FILTERS_FILE_NAME, GIRDER_DIR_NAME, HISTORY_FILE_NAME,
};
use crate::domain::HistoryLimits;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the gitignore file within .girder
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Maximum directory depth to traverse when searching for the girder root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Largest accepted per-category cap
pub const MAX_CONFIGURABLE_ITEMS: usize = 10_000;

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created girder directory
    pub girder_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created history file
    pub history_file: PathBuf,
    /// Path to the created filters file
    pub filters_file: PathBuf,
    /// The default history cap written to the config
    pub default_max_items: usize,
}

/// Validate a history cap supplied on the command line.
///
/// # Errors
///
/// Rejects zero (a list must retain at least the item just recorded) and
/// caps above [`MAX_CONFIGURABLE_ITEMS`].
pub fn validate_max_items(max_items: usize) -> Result<()> {
    if max_items == 0 {
        return Err(Error::Config(
            "History cap must be at least 1".to_string(),
        ));
    }

    if max_items > MAX_CONFIGURABLE_ITEMS {
        return Err(Error::Config(format!(
            "History cap cannot exceed {MAX_CONFIGURABLE_ITEMS}"
        )));
    }

    Ok(())
}

/// Initialize a new girder directory under `base_dir`.
///
/// # Arguments
///
/// * `base_dir` - The base directory where `.girder/` will be created
/// * `max_items` - Optional default history cap (defaults to 50)
///
/// # Errors
///
/// Returns an error if:
/// - The `.girder/` directory already exists
/// - The cap is invalid
/// - File system operations fail
pub async fn init(base_dir: &Path, max_items: Option<usize>) -> Result<InitResult> {
    let limits = match max_items {
        Some(max) => {
            validate_max_items(max)?;
            HistoryLimits::with_default(max)
        }
        None => HistoryLimits::default(),
    };

    let girder_dir = base_dir.join(GIRDER_DIR_NAME);

    if girder_dir.exists() {
        return Err(Error::Config(format!(
            "Girder is already initialized in this directory. Found existing '{GIRDER_DIR_NAME}'"
        )));
    }

    fs::create_dir_all(&girder_dir).await?;

    // Create config.yaml
    let config_file = girder_dir.join(CONFIG_FILE_NAME);
    let default_max_items = limits.default_max;
    let config = GirderConfig {
        history: limits,
        ..GirderConfig::default()
    };
    config.save(&config_file).await?;

    // Create empty data files
    let history_file = girder_dir.join(HISTORY_FILE_NAME);
    fs::write(&history_file, "").await?;

    let filters_file = girder_dir.join(FILTERS_FILE_NAME);
    fs::write(&filters_file, "").await?;

    // Create .gitignore inside .girder
    let gitignore_file = girder_dir.join(GITIGNORE_FILE_NAME);
    let gitignore_content = "\
# Per-user recently-viewed data; not meaningful to share
history.jsonl
filters.jsonl
";
    fs::write(&gitignore_file, gitignore_content).await?;

    Ok(InitResult {
        girder_dir,
        config_file,
        history_file,
        filters_file,
        default_max_items,
    })
}

/// Check if a directory has been initialized with girder.
///
/// Returns `true` if the `.girder/` directory exists.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(GIRDER_DIR_NAME).exists()
}

/// Find the girder root directory by searching up the directory tree.
///
/// Starts from the given directory and traverses parent directories
/// until a `.girder/` directory is found, the root is reached, or
/// the maximum traversal depth is exceeded.
///
/// # Returns
///
/// Returns `Some(path)` with the directory containing `.girder/`,
/// or `None` if no girder directory is found within the depth limit.
pub fn find_girder_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(GIRDER_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
