//! In-memory backing store for user history rows.

use super::UserHistoryStore;
use crate::domain::{HistoryCategory, UserHistoryItem, UserKey};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Ephemeral backing store holding rows in RAM.
///
/// Rows are kept per user, per category, ordered most-recent-first. This
/// store enforces row uniqueness but applies no cap; bounding is the
/// caching layer's job (via [`expire_old_items`](UserHistoryStore::expire_old_items)).
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    rows: HashMap<UserKey, BTreeMap<HistoryCategory, Vec<UserHistoryItem>>>,
}

impl InMemoryHistoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows across all users and categories.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Iterates over every row, grouped by user then category, with lists
    /// most-recent-first. Used by the persistence wrapper to snapshot the
    /// store.
    pub(super) fn iter_rows(&self) -> impl Iterator<Item = (&UserKey, &UserHistoryItem)> {
        let mut users: Vec<&UserKey> = self.rows.keys().collect();
        users.sort();
        users.into_iter().flat_map(move |user| {
            self.rows[user]
                .values()
                .flatten()
                .map(move |item| (user, item))
        })
    }

    /// Inserts a row during bulk load, keeping lists ordered by
    /// `last_viewed` descending. Returns `false` if the entity was already
    /// present (the duplicate is dropped).
    pub(super) fn load_row(&mut self, user: UserKey, item: UserHistoryItem) -> bool {
        let list = self
            .rows
            .entry(user)
            .or_default()
            .entry(item.category)
            .or_default();
        if list.iter().any(|existing| existing.entity_id == item.entity_id) {
            return false;
        }
        let position = list
            .iter()
            .position(|existing| existing.last_viewed < item.last_viewed)
            .unwrap_or(list.len());
        list.insert(position, item);
        true
    }

    fn list_mut(
        &mut self,
        user: &UserKey,
        category: HistoryCategory,
    ) -> Option<&mut Vec<UserHistoryItem>> {
        self.rows.get_mut(user)?.get_mut(&category)
    }
}

#[async_trait]
impl UserHistoryStore for InMemoryHistoryStore {
    async fn add_item(&mut self, user: &UserKey, item: UserHistoryItem) -> Result<()> {
        item.validate().map_err(Error::InvalidItem)?;

        let list = self
            .rows
            .entry(user.clone())
            .or_default()
            .entry(item.category)
            .or_default();

        if list.iter().any(|existing| existing.entity_id == item.entity_id) {
            return Err(Error::DuplicateItem {
                user: user.clone(),
                category: item.category,
                entity_id: item.entity_id,
            });
        }

        list.insert(0, item);
        Ok(())
    }

    async fn update_item(&mut self, user: &UserKey, item: UserHistoryItem) -> Result<()> {
        item.validate().map_err(Error::InvalidItem)?;

        let Some(list) = self.list_mut(user, item.category) else {
            return Err(Error::ItemNotFound {
                user: user.clone(),
                category: item.category,
                entity_id: item.entity_id,
            });
        };

        let Some(position) = list
            .iter()
            .position(|existing| existing.entity_id == item.entity_id)
        else {
            return Err(Error::ItemNotFound {
                user: user.clone(),
                category: item.category,
                entity_id: item.entity_id,
            });
        };

        // Refreshed rows move to the front to keep the list ordered.
        list.remove(position);
        list.insert(0, item);
        Ok(())
    }

    async fn remove_item(
        &mut self,
        user: &UserKey,
        category: HistoryCategory,
        entity_id: &str,
    ) -> Result<bool> {
        let Some(list) = self.list_mut(user, category) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|existing| existing.entity_id != entity_id);
        Ok(list.len() < before)
    }

    async fn get_history(
        &self,
        user: &UserKey,
        category: HistoryCategory,
    ) -> Result<Vec<UserHistoryItem>> {
        Ok(self
            .rows
            .get(user)
            .and_then(|categories| categories.get(&category))
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_user(&mut self, user: &UserKey) -> Result<BTreeSet<HistoryCategory>> {
        let Some(categories) = self.rows.remove(user) else {
            return Ok(BTreeSet::new());
        };
        Ok(categories
            .into_iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(category, _)| category)
            .collect())
    }

    async fn expire_old_items(
        &mut self,
        user: &UserKey,
        category: HistoryCategory,
        keep: usize,
    ) -> Result<usize> {
        let Some(list) = self.list_mut(user, category) else {
            return Ok(0);
        };
        let before = list.len();
        list.truncate(keep);
        Ok(before - list.len())
    }
}
