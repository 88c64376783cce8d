//! Caching layer over a backing history store.

use super::bounded::{BoundedHistory, RecordOutcome};
use super::UserHistoryStore;
use crate::domain::{HistoryCategory, HistoryLimits, UserHistoryItem, UserKey};
use crate::error::{Error, Result};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;

type CacheKey = (UserKey, HistoryCategory);

/// Bounded per-(user, category) cache over a backing [`UserHistoryStore`].
///
/// This type owns the business-rule sequencing the backing store
/// deliberately lacks:
///
/// - **Ordering**: lists are most-recent-first; re-recording an entity
///   moves it to the front instead of duplicating it.
/// - **Bounding**: after an add, a list never exceeds its per-category cap;
///   tail items are evicted from cache and store alike.
/// - **Divergence repair**: when the cache and store disagree about whether
///   a row exists, the write is retried exactly once via the opposite row
///   operation (insert after an explicit remove, or plain insert when an
///   update finds nothing). A second failure propagates and the cache
///   entry is invalidated so the next access reloads from the store.
/// - **Degraded reads**: a backing-store error during [`get`](Self::get)
///   is logged and surfaced as an empty list. The empty result is not
///   cached, so the next access retries the load.
pub struct CachingHistoryStore {
    store: Box<dyn UserHistoryStore>,
    limits: HistoryLimits,
    cache: Mutex<HashMap<CacheKey, BoundedHistory>>,
}

impl CachingHistoryStore {
    /// Creates a caching layer over the given backing store.
    #[must_use]
    pub fn new(store: Box<dyn UserHistoryStore>, limits: HistoryLimits) -> Self {
        Self {
            store,
            limits,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The configured retention limits.
    #[must_use]
    pub fn limits(&self) -> &HistoryLimits {
        &self.limits
    }

    /// Records an interaction for the user.
    ///
    /// Inserts the item at the front of its (user, category) list or moves
    /// the existing entry with the same entity id to the front, trims the
    /// tail beyond the category's cap, and writes through to the backing
    /// store with retry-once divergence repair.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidItem` if the item fails validation
    /// - any backing-store error that survives the single repair attempt;
    ///   the cache entry is invalidated first so a later add starts from
    ///   the store's actual state
    pub async fn add(&mut self, user: &UserKey, item: UserHistoryItem) -> Result<()> {
        item.validate().map_err(Error::InvalidItem)?;
        let category = item.category;
        let cap = self.limits.max_for(category);
        let key = (user.clone(), category);

        let mut cache = self.cache.lock().await;
        let entry = match cache.entry(key.clone()) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                // A load failure here is survivable: starting from an empty
                // view can only produce insert conflicts, which the repair
                // path below resolves.
                let loaded = match self.store.get_history(user, category).await {
                    Ok(items) => items,
                    Err(error) => {
                        tracing::warn!(
                            user = %user,
                            category = %category,
                            error = %error,
                            "history load failed during add, assuming empty"
                        );
                        Vec::new()
                    }
                };
                slot.insert(BoundedHistory::from_items(cap, loaded))
            }
        };

        match entry.record(item.clone()) {
            RecordOutcome::Refreshed => match self.store.update_item(user, item.clone()).await {
                Ok(()) => {}
                Err(Error::ItemNotFound { .. }) => {
                    tracing::warn!(
                        user = %user,
                        category = %category,
                        entity_id = %item.entity_id,
                        "cached item missing from store, re-inserting"
                    );
                    if let Err(error) = self.store.add_item(user, item).await {
                        cache.remove(&key);
                        return Err(error);
                    }
                }
                Err(error) => {
                    cache.remove(&key);
                    return Err(error);
                }
            },
            RecordOutcome::Inserted { evicted } => {
                match self.store.add_item(user, item.clone()).await {
                    Ok(()) => {}
                    Err(Error::DuplicateItem { .. }) => {
                        tracing::warn!(
                            user = %user,
                            category = %category,
                            entity_id = %item.entity_id,
                            "conflicting store row, removing and retrying insert"
                        );
                        if let Err(error) =
                            self.store.remove_item(user, category, &item.entity_id).await
                        {
                            cache.remove(&key);
                            return Err(error);
                        }
                        if let Err(error) = self.store.add_item(user, item).await {
                            cache.remove(&key);
                            return Err(error);
                        }
                    }
                    Err(error) => {
                        cache.remove(&key);
                        return Err(error);
                    }
                }

                // Eviction is a separate store operation from the insert;
                // its failure invalidates the cache entry so the trim is
                // retried from a clean load on the next add.
                if !evicted.is_empty() {
                    if let Err(error) = self.store.expire_old_items(user, category, cap).await {
                        cache.remove(&key);
                        return Err(error);
                    }
                }
            }
        }

        Ok(())
    }

    /// Returns the user's recent items in one category, most-recent-first.
    ///
    /// Serves from cache when possible, loading from the backing store on
    /// a miss. A backing-store failure yields an empty list and is not
    /// cached, so the next call retries.
    pub async fn get(&self, user: &UserKey, category: HistoryCategory) -> Vec<UserHistoryItem> {
        let key = (user.clone(), category);
        let mut cache = self.cache.lock().await;

        if let Some(entry) = cache.get(&key) {
            return entry.items().to_vec();
        }

        match self.store.get_history(user, category).await {
            Ok(items) => {
                let entry = BoundedHistory::from_items(self.limits.max_for(category), items);
                let result = entry.items().to_vec();
                cache.insert(key, entry);
                result
            }
            Err(error) => {
                tracing::warn!(
                    user = %user,
                    category = %category,
                    error = %error,
                    "history read failed, returning empty"
                );
                Vec::new()
            }
        }
    }

    /// Removes every trace of the user: cached lists and backing rows.
    ///
    /// Returns the set of categories that had data in either place.
    ///
    /// # Errors
    ///
    /// Propagates backing-store failures. The cache is invalidated before
    /// the store is touched, so a failure cannot leave stale cached data.
    pub async fn remove_user(&mut self, user: &UserKey) -> Result<BTreeSet<HistoryCategory>> {
        let mut categories = BTreeSet::new();
        {
            let mut cache = self.cache.lock().await;
            cache.retain(|(cached_user, category), entry| {
                if cached_user == user {
                    if !entry.is_empty() {
                        categories.insert(*category);
                    }
                    false
                } else {
                    true
                }
            });
        }

        categories.extend(self.store.remove_user(user).await?);
        Ok(categories)
    }
}

impl std::fmt::Debug for CachingHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingHistoryStore")
            .field("limits", &self.limits)
            .field("store", &"<dyn UserHistoryStore>")
            .finish()
    }
}
