//! Error types for girder operations.

use crate::domain::{HistoryCategory, UserKey};
use std::io;
use thiserror::Error;

/// The error type for girder operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization or parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the JSONL persistence layer.
    #[error("JSONL error: {0}")]
    Jsonl(#[from] girder_jsonl::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Not inside an initialized girder repository.
    #[error("Not a girder repository (no .girder directory found). Run 'girder init' first.")]
    NotInitialized,

    /// Insert of a row that already exists in the backing store.
    ///
    /// Signals cache/store divergence: the cache believed the item was new.
    #[error("history item already recorded: {category}/{entity_id} for user {user}")]
    DuplicateItem {
        /// The owning user
        user: UserKey,
        /// The item's category
        category: HistoryCategory,
        /// The conflicting entity id
        entity_id: String,
    },

    /// Update of a row the backing store doesn't have.
    ///
    /// Signals cache/store divergence: the cache believed the item existed.
    #[error("history item not found: {category}/{entity_id} for user {user}")]
    ItemNotFound {
        /// The owning user
        user: UserKey,
        /// The item's category
        category: HistoryCategory,
        /// The missing entity id
        entity_id: String,
    },

    /// History item failed validation.
    #[error("invalid history item: {0}")]
    InvalidItem(String),

    /// Backup file could not be interpreted.
    #[error("backup error: {0}")]
    Backup(String),
}

/// A specialized Result type for girder operations.
pub type Result<T> = std::result::Result<T, Error>;
