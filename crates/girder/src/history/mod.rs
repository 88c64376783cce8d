//! The bounded user history cache and its backing stores.
//!
//! For each (user, category) pair girder maintains an ordered list of
//! recent interaction records, most-recent-first, capped at a per-category
//! configurable maximum, with update-in-place semantics when an existing
//! entity is re-recorded (move to front rather than duplicate).
//!
//! # Architecture
//!
//! The layer is split the way the original system split it:
//!
//! - [`UserHistoryStore`] is the backing-store contract: granular row
//!   operations with no sequencing logic. Inserting an existing row fails
//!   with [`Error::DuplicateItem`](crate::error::Error::DuplicateItem) and
//!   updating a missing row fails with
//!   [`Error::ItemNotFound`](crate::error::Error::ItemNotFound); these are
//!   the divergence signals the caching layer repairs.
//! - [`InMemoryHistoryStore`] keeps rows in RAM only.
//! - [`JsonlHistoryStore`] wraps the in-memory store with write-through
//!   JSONL persistence: every mutation atomically rewrites the data file.
//! - [`CachingHistoryStore`] owns the business-rule sequencing: bounded
//!   per-key caches, move-to-front, tail trimming, retry-once divergence
//!   repair, and degrade-to-empty reads.
//! - [`SessionHistoryStore`] serves anonymous users keyed by session id,
//!   with the same bounding semantics and no persistence.
//!
//! # Thread Safety
//!
//! Store implementations must be `Send + Sync`. The trait is object-safe,
//! allowing dynamic dispatch via `Box<dyn UserHistoryStore>`.

use crate::domain::{HistoryCategory, UserHistoryItem, UserKey};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

mod bounded;
mod cached;
mod in_memory;
mod persistent;
mod session;

pub use bounded::{BoundedHistory, RecordOutcome};
pub use cached::CachingHistoryStore;
pub use in_memory::InMemoryHistoryStore;
pub use persistent::{JsonlHistoryStore, LoadWarning};
pub use session::SessionHistoryStore;

/// Backing-store contract for user history rows.
///
/// Implementations store flat rows and enforce row-level uniqueness; all
/// ordering and bounding policy lives in [`CachingHistoryStore`]. Methods
/// that mutate a single row are deliberately split into insert vs update
/// so the caching layer can detect when its view of the store has
/// diverged and repair it.
#[async_trait]
pub trait UserHistoryStore: Send + Sync {
    /// Insert a new row.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidItem` if the item fails validation
    /// - `Error::DuplicateItem` if a row for (user, category, entity) exists
    async fn add_item(&mut self, user: &UserKey, item: UserHistoryItem) -> Result<()>;

    /// Refresh the timestamp and data of an existing row.
    ///
    /// # Errors
    ///
    /// - `Error::ItemNotFound` if no row for (user, category, entity) exists
    async fn update_item(&mut self, user: &UserKey, item: UserHistoryItem) -> Result<()>;

    /// Remove a single row. Returns `true` if a row was removed.
    ///
    /// Removing an absent row is not an error; the caller often cannot
    /// know whether the row exists (that is exactly the divergence case).
    async fn remove_item(
        &mut self,
        user: &UserKey,
        category: HistoryCategory,
        entity_id: &str,
    ) -> Result<bool>;

    /// Return the user's rows for one category, most-recent-first.
    ///
    /// Returns an empty vector for an unknown user or empty category.
    async fn get_history(
        &self,
        user: &UserKey,
        category: HistoryCategory,
    ) -> Result<Vec<UserHistoryItem>>;

    /// Remove every row for the user across all categories.
    ///
    /// Returns the set of categories that actually had rows.
    async fn remove_user(&mut self, user: &UserKey) -> Result<BTreeSet<HistoryCategory>>;

    /// Trim the user's rows in one category down to `keep` items,
    /// dropping the oldest. Returns the number of rows removed.
    async fn expire_old_items(
        &mut self,
        user: &UserKey,
        category: HistoryCategory,
        keep: usize,
    ) -> Result<usize>;
}

// ========== Test Utilities ==========

/// The entity id served by [`MockHistoryStore`].
#[cfg(any(test, feature = "test-util"))]
pub const MOCK_ENTITY_ID: &str = "MOCK-1";

/// Stateless mock implementation of [`UserHistoryStore`] for testing.
///
/// Accepts all writes without storing them and serves a single hardcoded
/// issue row from `get_history`. Useful for verifying code that accepts a
/// `Box<dyn UserHistoryStore>` without wiring up real storage; use
/// [`InMemoryHistoryStore`] when tests need actual row semantics.
#[cfg(any(test, feature = "test-util"))]
#[derive(Clone, Copy, Default)]
#[non_exhaustive]
pub struct MockHistoryStore;

#[cfg(any(test, feature = "test-util"))]
impl MockHistoryStore {
    /// Create a new MockHistoryStore instance.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// The single item served by this mock, timestamped now.
    #[must_use]
    pub fn mock_item() -> UserHistoryItem {
        UserHistoryItem::new(HistoryCategory::Issue, MOCK_ENTITY_ID)
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl UserHistoryStore for MockHistoryStore {
    async fn add_item(&mut self, _user: &UserKey, item: UserHistoryItem) -> Result<()> {
        item.validate().map_err(crate::error::Error::InvalidItem)?;
        Ok(())
    }

    async fn update_item(&mut self, _user: &UserKey, _item: UserHistoryItem) -> Result<()> {
        Ok(())
    }

    async fn remove_item(
        &mut self,
        _user: &UserKey,
        _category: HistoryCategory,
        _entity_id: &str,
    ) -> Result<bool> {
        Ok(false)
    }

    async fn get_history(
        &self,
        _user: &UserKey,
        category: HistoryCategory,
    ) -> Result<Vec<UserHistoryItem>> {
        if category == HistoryCategory::Issue {
            Ok(vec![Self::mock_item()])
        } else {
            Ok(vec![])
        }
    }

    async fn remove_user(&mut self, _user: &UserKey) -> Result<BTreeSet<HistoryCategory>> {
        Ok(BTreeSet::new())
    }

    async fn expire_old_items(
        &mut self,
        _user: &UserKey,
        _category: HistoryCategory,
        _keep: usize,
    ) -> Result<usize> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trait_is_object_safe() {
        let mut store: Box<dyn UserHistoryStore> = Box::new(MockHistoryStore::new());
        let user = UserKey::new("alice");

        store
            .add_item(&user, MockHistoryStore::mock_item())
            .await
            .unwrap();

        let history = store
            .get_history(&user, HistoryCategory::Issue)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].entity_id, MOCK_ENTITY_ID);

        let other = store
            .get_history(&user, HistoryCategory::Project)
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn mock_rejects_invalid_items() {
        let mut store = MockHistoryStore::new();
        let user = UserKey::new("alice");
        let mut item = MockHistoryStore::mock_item();
        item.entity_id = String::new();

        let result = store.add_item(&user, item).await;
        assert!(result.is_err());
    }
}
