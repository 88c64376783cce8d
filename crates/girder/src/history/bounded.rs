//! Bounded most-recent-first item list.

use crate::domain::UserHistoryItem;
use std::collections::HashSet;

/// Outcome of recording an item into a [`BoundedHistory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The entity was not present; it was inserted at the front.
    /// Items trimmed from the tail to stay within the cap are returned.
    Inserted {
        /// Items evicted from the tail, oldest last.
        evicted: Vec<UserHistoryItem>,
    },

    /// The entity was already present; it was moved to the front with a
    /// refreshed timestamp and the list did not grow.
    Refreshed,
}

/// An ordered list of history items, most-recent-first, capped in length
/// and deduplicated by entity id.
///
/// Re-recording an entity moves it to the front instead of duplicating it.
/// Membership is tracked in a set keyed by entity id; positional shifts on
/// move-to-front are linear in the list length, which is bounded by the cap.
#[derive(Debug, Clone)]
pub struct BoundedHistory {
    items: Vec<UserHistoryItem>,
    entity_ids: HashSet<String>,
    cap: usize,
}

impl BoundedHistory {
    /// Creates an empty history with the given cap (minimum one).
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            items: Vec::new(),
            entity_ids: HashSet::new(),
            cap: cap.max(1),
        }
    }

    /// Builds a history from items already ordered most-recent-first,
    /// dropping duplicates and anything beyond the cap.
    #[must_use]
    pub fn from_items<I>(cap: usize, items: I) -> Self
    where
        I: IntoIterator<Item = UserHistoryItem>,
    {
        let cap = cap.max(1);
        let mut history = Self::new(cap);
        for item in items {
            if history.items.len() >= cap {
                break;
            }
            if history.entity_ids.insert(item.entity_id.clone()) {
                history.items.push(item);
            }
        }
        history
    }

    /// Records an item: inserts it at the front, or moves the existing
    /// entry with the same entity id to the front.
    ///
    /// After this call the list holds at most `cap` items; anything trimmed
    /// from the tail is reported in the outcome.
    pub fn record(&mut self, item: UserHistoryItem) -> RecordOutcome {
        if self.entity_ids.contains(&item.entity_id) {
            self.items.retain(|existing| existing.entity_id != item.entity_id);
            self.items.insert(0, item);
            return RecordOutcome::Refreshed;
        }

        self.entity_ids.insert(item.entity_id.clone());
        self.items.insert(0, item);

        let mut evicted = Vec::new();
        while self.items.len() > self.cap {
            let victim = self.items.remove(self.items.len() - 1);
            self.entity_ids.remove(&victim.entity_id);
            evicted.push(victim);
        }
        RecordOutcome::Inserted { evicted }
    }

    /// Removes the entry with the given entity id, if present.
    pub fn remove(&mut self, entity_id: &str) -> bool {
        if self.entity_ids.remove(entity_id) {
            self.items.retain(|existing| existing.entity_id != entity_id);
            true
        } else {
            false
        }
    }

    /// Returns `true` if an entry with the given entity id is present.
    #[must_use]
    pub fn contains(&self, entity_id: &str) -> bool {
        self.entity_ids.contains(entity_id)
    }

    /// Returns the items, most-recent-first.
    #[must_use]
    pub fn items(&self) -> &[UserHistoryItem] {
        &self.items
    }

    /// Returns the number of items held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no items are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the configured cap.
    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }
}
