//! Domain types for user history tracking.
//!
//! This module contains the core types shared by every history store:
//! user keys, history categories, and the recorded items themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default cap on items retained per (user, category) pair.
pub const DEFAULT_MAX_ITEMS: usize = 50;

/// Unique key identifying a user.
///
/// For signed-in users this is the stable user key from the host
/// application; anonymous users are addressed by session id through
/// [`SessionHistoryStore`](crate::history::SessionHistoryStore) instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserKey(pub String);

impl UserKey {
    /// Create a new user key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Category of recorded interaction.
///
/// Each category has its own bounded, independently ordered list per user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HistoryCategory {
    /// A viewed issue
    Issue,

    /// A visited project
    Project,

    /// A search query that was run
    #[serde(rename = "jql_query")]
    JqlQuery,

    /// A viewed dashboard
    Dashboard,

    /// A user picked as assignee
    Assignee,
}

impl HistoryCategory {
    /// All known categories, in display order.
    pub const ALL: [HistoryCategory; 5] = [
        HistoryCategory::Issue,
        HistoryCategory::Project,
        HistoryCategory::JqlQuery,
        HistoryCategory::Dashboard,
        HistoryCategory::Assignee,
    ];

    /// Returns the category's canonical snake_case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryCategory::Issue => "issue",
            HistoryCategory::Project => "project",
            HistoryCategory::JqlQuery => "jql_query",
            HistoryCategory::Dashboard => "dashboard",
            HistoryCategory::Assignee => "assignee",
        }
    }
}

impl fmt::Display for HistoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HistoryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issue" => Ok(HistoryCategory::Issue),
            "project" => Ok(HistoryCategory::Project),
            "jql_query" => Ok(HistoryCategory::JqlQuery),
            "dashboard" => Ok(HistoryCategory::Dashboard),
            "assignee" => Ok(HistoryCategory::Assignee),
            other => Err(format!(
                "unknown history category '{other}' (expected one of: issue, project, jql_query, dashboard, assignee)"
            )),
        }
    }
}

/// A single recorded user interaction.
///
/// Items are deduplicated by `entity_id` within a (user, category) list:
/// re-recording an entity refreshes `last_viewed` and moves the item to
/// the front instead of adding a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHistoryItem {
    /// Category this item belongs to
    pub category: HistoryCategory,

    /// Identifier of the visited entity (issue key, project key, ...)
    pub entity_id: String,

    /// When the entity was last visited
    pub last_viewed: DateTime<Utc>,

    /// Optional payload, e.g. the JQL text for a recorded search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl UserHistoryItem {
    /// Create a new item timestamped now.
    pub fn new(category: HistoryCategory, entity_id: impl Into<String>) -> Self {
        Self {
            category,
            entity_id: entity_id.into(),
            last_viewed: Utc::now(),
            data: None,
        }
    }

    /// Create a new item timestamped now, carrying a data payload.
    pub fn with_data(
        category: HistoryCategory,
        entity_id: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::new(category, entity_id)
        }
    }

    /// Validate item fields.
    ///
    /// # Errors
    ///
    /// Returns a message suitable for an error collection when the entity
    /// id is empty or whitespace-only.
    pub fn validate(&self) -> Result<(), String> {
        if self.entity_id.trim().is_empty() {
            return Err("entity id must not be empty".to_string());
        }
        Ok(())
    }
}

/// Per-category retention caps.
///
/// A category without an explicit override uses `default_max`. A cap of
/// zero is normalized to one: an "add" must always be able to retain the
/// item it just recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLimits {
    /// Cap applied to categories without an override
    #[serde(rename = "default-max-items")]
    pub default_max: usize,

    /// Per-category overrides
    #[serde(default, rename = "max-items")]
    pub overrides: BTreeMap<HistoryCategory, usize>,
}

impl HistoryLimits {
    /// Create limits with the given default and no overrides.
    #[must_use]
    pub fn with_default(default_max: usize) -> Self {
        Self {
            default_max,
            overrides: BTreeMap::new(),
        }
    }

    /// Set an override for one category.
    #[must_use]
    pub fn with_override(mut self, category: HistoryCategory, max: usize) -> Self {
        self.overrides.insert(category, max);
        self
    }

    /// Returns the effective cap for a category, never below one.
    #[must_use]
    pub fn max_for(&self, category: HistoryCategory) -> usize {
        self.overrides
            .get(&category)
            .copied()
            .unwrap_or(self.default_max)
            .max(1)
    }
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self::with_default(DEFAULT_MAX_ITEMS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::issue(HistoryCategory::Issue, "issue")]
    #[case::project(HistoryCategory::Project, "project")]
    #[case::jql(HistoryCategory::JqlQuery, "jql_query")]
    #[case::dashboard(HistoryCategory::Dashboard, "dashboard")]
    #[case::assignee(HistoryCategory::Assignee, "assignee")]
    fn category_round_trips_through_str(#[case] category: HistoryCategory, #[case] name: &str) {
        assert_eq!(category.as_str(), name);
        assert_eq!(name.parse::<HistoryCategory>().unwrap(), category);
    }

    #[test]
    fn unknown_category_is_rejected_with_candidates() {
        let err = "sprint".parse::<HistoryCategory>().unwrap_err();
        assert!(err.contains("sprint"));
        assert!(err.contains("issue"));
    }

    #[test]
    fn category_serde_uses_snake_case() {
        let json = serde_json::to_string(&HistoryCategory::JqlQuery).unwrap();
        assert_eq!(json, "\"jql_query\"");
    }

    #[test]
    fn item_validation_rejects_blank_entity_ids() {
        let mut item = UserHistoryItem::new(HistoryCategory::Issue, "PROJ-1");
        assert!(item.validate().is_ok());

        item.entity_id = "   ".to_string();
        assert!(item.validate().is_err());
    }

    #[test]
    fn item_data_is_omitted_from_json_when_absent() {
        let item = UserHistoryItem::new(HistoryCategory::Issue, "PROJ-1");
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("\"data\""));

        let item = UserHistoryItem::with_data(HistoryCategory::JqlQuery, "q1", "status = open");
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("status = open"));
    }

    #[rstest]
    #[case::uses_default(HistoryCategory::Issue, 50)]
    #[case::uses_override(HistoryCategory::JqlQuery, 10)]
    fn limits_resolve_per_category(#[case] category: HistoryCategory, #[case] expected: usize) {
        let limits = HistoryLimits::default().with_override(HistoryCategory::JqlQuery, 10);
        assert_eq!(limits.max_for(category), expected);
    }

    #[test]
    fn zero_cap_is_normalized_to_one() {
        let limits = HistoryLimits::with_default(0);
        assert_eq!(limits.max_for(HistoryCategory::Issue), 1);
    }
}
