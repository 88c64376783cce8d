//! JSONL write-through persistence for user history rows.
//!
//! [`JsonlHistoryStore`] wraps an [`InMemoryHistoryStore`] and rewrites the
//! data file atomically after every mutation, so the on-disk state always
//! reflects the last completed operation. Loading is resilient: corrupt or
//! invalid lines are skipped and reported as [`LoadWarning`]s rather than
//! making the whole file unreadable.

use super::{InMemoryHistoryStore, UserHistoryStore};
use crate::domain::{HistoryCategory, UserHistoryItem, UserKey};
use crate::error::Result;
use async_trait::async_trait;
use girder_jsonl::{read_jsonl_resilient, write_jsonl_atomic_iter, Warning as JsonlWarning};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// One line of the history data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryRow {
    user: UserKey,
    #[serde(flatten)]
    item: UserHistoryItem,
}

/// Warnings that can occur while loading the history data file.
///
/// These are non-fatal: the load continues and the problematic row is
/// skipped. Callers should log them, since they indicate the file was
/// corrupted or hand-edited.
#[derive(Debug, Clone)]
pub enum LoadWarning {
    /// A line could not be parsed as a history row.
    MalformedLine {
        /// The 1-based line number of the bad line.
        line_number: usize,
        /// A description of the parse error.
        error: String,
    },

    /// A row parsed but failed item validation.
    InvalidRow {
        /// The owning user.
        user: UserKey,
        /// The row's entity id.
        entity_id: String,
        /// The validation failure.
        error: String,
    },

    /// A second row for the same (user, category, entity) was dropped.
    DuplicateRow {
        /// The owning user.
        user: UserKey,
        /// The duplicated category.
        category: HistoryCategory,
        /// The duplicated entity id.
        entity_id: String,
    },
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadWarning::MalformedLine { line_number, error } => {
                write!(f, "line {line_number}: malformed row: {error}")
            }
            LoadWarning::InvalidRow {
                user,
                entity_id,
                error,
            } => write!(f, "invalid row {entity_id} for user {user}: {error}"),
            LoadWarning::DuplicateRow {
                user,
                category,
                entity_id,
            } => write!(f, "duplicate row {category}/{entity_id} for user {user}"),
        }
    }
}

/// Durable backing store over a JSONL file.
///
/// All reads are served from the in-memory mirror; every mutation is
/// written through to disk before the call returns. A failed write leaves
/// the file at its previous state (atomic replace) but the in-memory
/// mirror may be ahead; callers that care should reload on write failure.
pub struct JsonlHistoryStore {
    inner: InMemoryHistoryStore,
    path: PathBuf,
}

impl JsonlHistoryStore {
    /// Opens the store, loading existing rows from `path` if it exists.
    ///
    /// A missing file yields an empty store; it is created on the first
    /// write. Returns any warnings produced while loading.
    ///
    /// # Errors
    ///
    /// Fails if an existing file cannot be read.
    pub async fn open(path: impl Into<PathBuf>) -> Result<(Self, Vec<LoadWarning>)> {
        let path = path.into();
        let mut inner = InMemoryHistoryStore::new();
        let mut warnings = Vec::new();

        if path.exists() {
            let (rows, jsonl_warnings) = read_jsonl_resilient::<HistoryRow, _>(&path).await?;

            for warning in jsonl_warnings {
                match warning {
                    JsonlWarning::MalformedJson { line_number, error } => {
                        warnings.push(LoadWarning::MalformedLine { line_number, error });
                    }
                    JsonlWarning::SkippedLine {
                        line_number,
                        reason,
                    } => {
                        warnings.push(LoadWarning::MalformedLine {
                            line_number,
                            error: reason,
                        });
                    }
                }
            }

            for row in rows {
                if let Err(error) = row.item.validate() {
                    warnings.push(LoadWarning::InvalidRow {
                        user: row.user,
                        entity_id: row.item.entity_id,
                        error,
                    });
                    continue;
                }
                let (user, category, entity_id) =
                    (row.user.clone(), row.item.category, row.item.entity_id.clone());
                if !inner.load_row(row.user, row.item) {
                    warnings.push(LoadWarning::DuplicateRow {
                        user,
                        category,
                        entity_id,
                    });
                }
            }
        }

        Ok((Self { inner, path }, warnings))
    }

    /// Path of the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total number of rows currently held.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.inner.row_count()
    }

    async fn persist(&self) -> Result<()> {
        // A named fn (not a closure) so the iterator is higher-ranked over
        // the row lifetimes; a closure here fails to compile when held
        // across the `.await` below.
        fn to_row((user, item): (&UserKey, &UserHistoryItem)) -> HistoryRow {
            HistoryRow {
                user: user.clone(),
                item: item.clone(),
            }
        }
        let rows = self.inner.iter_rows().map(to_row);
        write_jsonl_atomic_iter(&self.path, rows).await?;
        Ok(())
    }
}

#[async_trait]
impl UserHistoryStore for JsonlHistoryStore {
    async fn add_item(&mut self, user: &UserKey, item: UserHistoryItem) -> Result<()> {
        self.inner.add_item(user, item).await?;
        self.persist().await
    }

    async fn update_item(&mut self, user: &UserKey, item: UserHistoryItem) -> Result<()> {
        self.inner.update_item(user, item).await?;
        self.persist().await
    }

    async fn remove_item(
        &mut self,
        user: &UserKey,
        category: HistoryCategory,
        entity_id: &str,
    ) -> Result<bool> {
        let removed = self.inner.remove_item(user, category, entity_id).await?;
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    async fn get_history(
        &self,
        user: &UserKey,
        category: HistoryCategory,
    ) -> Result<Vec<UserHistoryItem>> {
        self.inner.get_history(user, category).await
    }

    async fn remove_user(&mut self, user: &UserKey) -> Result<BTreeSet<HistoryCategory>> {
        let categories = self.inner.remove_user(user).await?;
        if !categories.is_empty() {
            self.persist().await?;
        }
        Ok(categories)
    }

    async fn expire_old_items(
        &mut self,
        user: &UserKey,
        category: HistoryCategory,
        keep: usize,
    ) -> Result<usize> {
        let removed = self.inner.expire_old_items(user, category, keep).await?;
        if removed > 0 {
            self.persist().await?;
        }
        Ok(removed)
    }
}

impl std::fmt::Debug for JsonlHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlHistoryStore")
            .field("path", &self.path)
            .field("rows", &self.inner.row_count())
            .finish()
    }
}
