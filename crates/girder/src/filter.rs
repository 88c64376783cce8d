//! User-picker filters: who may be suggested for a user field.
//!
//! A [`UserFilter`] restricts which users a picker field offers, by group
//! membership and/or project role. A disabled filter imposes no
//! restriction at all; an enabled filter with empty groups and roles
//! matches nobody. Filters are validated into an
//! [`ErrorCollection`](crate::messages::ErrorCollection) keyed by field
//! name, and persisted one row per field id in a JSONL file.

use crate::error::Result;
use crate::messages::ErrorCollection;
use girder_jsonl::{read_jsonl_resilient, write_jsonl_atomic_iter, Warning};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Restriction on which users a picker field offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
    /// Whether the filter applies at all.
    pub enabled: bool,

    /// Group names whose members are allowed.
    #[serde(default)]
    pub groups: BTreeSet<String>,

    /// Project role ids whose members are allowed.
    #[serde(default)]
    pub roles: BTreeSet<u64>,
}

impl UserFilter {
    /// The no-restriction filter: disabled, no groups, no roles.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// An enabled filter allowing the given groups and roles.
    #[must_use]
    pub fn enabled(groups: BTreeSet<String>, roles: BTreeSet<u64>) -> Self {
        Self {
            enabled: true,
            groups,
            roles,
        }
    }

    /// Returns `true` if this filter imposes no restriction.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        !self.enabled
    }

    /// Validates the role ids alone, keyed under `"roles"`.
    ///
    /// This is the part of [`validate`](Self::validate) that needs no group
    /// registry; callers without one (the CLI, offline tooling) use it
    /// directly. A disabled filter is always valid.
    #[must_use]
    pub fn validate_roles(&self) -> ErrorCollection {
        let mut errors = ErrorCollection::new();
        if self.enabled && self.roles.contains(&0) {
            errors.add_error("roles", "role id must be a positive number");
        }
        errors
    }

    /// Validates the filter against the set of known group names.
    ///
    /// Problems are keyed: unknown groups under `"groups"`, bad role ids
    /// under `"roles"`. The first problem per field wins. A disabled
    /// filter is always valid regardless of its contents.
    #[must_use]
    pub fn validate(&self, known_groups: &BTreeSet<String>) -> ErrorCollection {
        let mut errors = self.validate_roles();
        if !self.enabled {
            return errors;
        }

        for group in &self.groups {
            if !known_groups.contains(group) {
                errors.add_error("groups", format!("group '{group}' does not exist"));
            }
        }

        errors
    }
}

/// One line of the filters data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FilterRow {
    field_id: String,
    #[serde(flatten)]
    filter: UserFilter,
}

/// JSONL-persisted collection of filters, keyed by picker field id.
///
/// Every mutation atomically rewrites the data file, matching the
/// write-through behavior of the history store.
#[derive(Debug)]
pub struct JsonlFilterStore {
    filters: BTreeMap<String, UserFilter>,
    path: PathBuf,
}

impl JsonlFilterStore {
    /// Opens the store, loading existing filters if the file exists.
    ///
    /// Corrupt lines are skipped and returned as warnings.
    ///
    /// # Errors
    ///
    /// Fails if an existing file cannot be read.
    pub async fn open(path: impl Into<PathBuf>) -> Result<(Self, Vec<Warning>)> {
        let path = path.into();
        let mut filters = BTreeMap::new();
        let mut warnings = Vec::new();

        if path.exists() {
            let (rows, file_warnings) = read_jsonl_resilient::<FilterRow, _>(&path).await?;
            warnings = file_warnings;
            for row in rows {
                // Last row for a field wins, matching append-then-compact files.
                filters.insert(row.field_id, row.filter);
            }
        }

        Ok((Self { filters, path }, warnings))
    }

    /// Path of the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the filter for a field, or the no-restriction default.
    #[must_use]
    pub fn get(&self, field_id: &str) -> UserFilter {
        self.filters.get(field_id).cloned().unwrap_or_default()
    }

    /// Returns `true` if an explicit filter is stored for the field.
    #[must_use]
    pub fn contains(&self, field_id: &str) -> bool {
        self.filters.contains_key(field_id)
    }

    /// Iterates over stored (field id, filter) pairs in field-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UserFilter)> {
        self.filters.iter().map(|(id, f)| (id.as_str(), f))
    }

    /// Stores a filter for a field and persists.
    ///
    /// # Errors
    ///
    /// Fails if the data file cannot be written; the previous file state
    /// is preserved on failure.
    pub async fn set(&mut self, field_id: impl Into<String>, filter: UserFilter) -> Result<()> {
        self.filters.insert(field_id.into(), filter);
        self.persist().await
    }

    /// Removes a field's filter, returning `true` if one was stored.
    ///
    /// # Errors
    ///
    /// Fails if the data file cannot be rewritten.
    pub async fn remove(&mut self, field_id: &str) -> Result<bool> {
        if self.filters.remove(field_id).is_none() {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    async fn persist(&self) -> Result<()> {
        let rows = self.filters.iter().map(|(field_id, filter)| FilterRow {
            field_id: field_id.clone(),
            filter: filter.clone(),
        });
        write_jsonl_atomic_iter(&self.path, rows).await?;
        Ok(())
    }
}
