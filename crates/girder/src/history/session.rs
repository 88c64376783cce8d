//! Session-keyed history for anonymous users.
//!
//! Anonymous visitors have no stable user key, so their history lives in
//! memory keyed by session id and disappears with the process. Ordering
//! and bounding semantics match [`CachingHistoryStore`](super::CachingHistoryStore);
//! there is no backing store and therefore no divergence to repair.

use super::bounded::BoundedHistory;
use crate::domain::{HistoryCategory, HistoryLimits, UserHistoryItem};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// In-memory history store keyed by session id.
#[derive(Debug)]
pub struct SessionHistoryStore {
    sessions: HashMap<String, BTreeMap<HistoryCategory, BoundedHistory>>,
    limits: HistoryLimits,
}

impl SessionHistoryStore {
    /// Creates an empty store with the given limits.
    #[must_use]
    pub fn new(limits: HistoryLimits) -> Self {
        Self {
            sessions: HashMap::new(),
            limits,
        }
    }

    /// Records an item for a session, with move-to-front semantics.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidItem` if the item fails validation.
    pub fn record(&mut self, session_id: &str, item: UserHistoryItem) -> Result<()> {
        item.validate().map_err(Error::InvalidItem)?;
        let cap = self.limits.max_for(item.category);
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .entry(item.category)
            .or_insert_with(|| BoundedHistory::new(cap))
            .record(item);
        Ok(())
    }

    /// Returns a session's recent items in one category, most-recent-first.
    #[must_use]
    pub fn recent(&self, session_id: &str, category: HistoryCategory) -> Vec<UserHistoryItem> {
        self.sessions
            .get(session_id)
            .and_then(|categories| categories.get(&category))
            .map(|history| history.items().to_vec())
            .unwrap_or_default()
    }

    /// Drops a session's history, returning the categories that had data.
    pub fn clear_session(&mut self, session_id: &str) -> BTreeSet<HistoryCategory> {
        let Some(categories) = self.sessions.remove(session_id) else {
            return BTreeSet::new();
        };
        categories
            .into_iter()
            .filter(|(_, history)| !history.is_empty())
            .map(|(category, _)| category)
            .collect()
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
