//! Mutable bags of validation errors and warnings.
//!
//! Validation in girder never throws on the first problem. Instead it
//! accumulates messages: [`MessageSet`] holds ordered, deduplicated error
//! and warning strings, and [`ErrorCollection`] additionally keys errors by
//! field name so a caller can attribute each problem to an input.

use serde::Serialize;
use std::collections::BTreeMap;

/// An ordered, deduplicated set of error and warning messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageSet {
    /// Error messages, in insertion order.
    error_messages: Vec<String>,
    /// Warning messages, in insertion order.
    warning_messages: Vec<String>,
}

impl MessageSet {
    /// Creates an empty message set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error message, ignoring exact duplicates.
    pub fn add_error_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.error_messages.contains(&message) {
            self.error_messages.push(message);
        }
    }

    /// Adds a warning message, ignoring exact duplicates.
    pub fn add_warning_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.warning_messages.contains(&message) {
            self.warning_messages.push(message);
        }
    }

    /// Absorbs all messages from another set.
    pub fn add_message_set(&mut self, other: &MessageSet) {
        for message in &other.error_messages {
            self.add_error_message(message.clone());
        }
        for message in &other.warning_messages {
            self.add_warning_message(message.clone());
        }
    }

    /// Returns the error messages in insertion order.
    #[must_use]
    pub fn error_messages(&self) -> &[String] {
        &self.error_messages
    }

    /// Returns the warning messages in insertion order.
    #[must_use]
    pub fn warning_messages(&self) -> &[String] {
        &self.warning_messages
    }

    /// Returns `true` if any error message has been added.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.error_messages.is_empty()
    }

    /// Returns `true` if any warning message has been added.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warning_messages.is_empty()
    }
}

/// Validation errors keyed by field name, plus unkeyed general errors.
///
/// Field-keyed errors attribute a problem to a specific input ("groups",
/// "backup-path"); general errors cover problems that span fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorCollection {
    /// Field name to error message. One message per field; later errors on
    /// the same field are ignored so the first problem reported wins.
    errors: BTreeMap<String, String>,
    /// Errors not attributable to a single field.
    error_messages: Vec<String>,
}

impl ErrorCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a named field. The first error on a field wins.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Adds a general error message, ignoring exact duplicates.
    pub fn add_error_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.error_messages.contains(&message) {
            self.error_messages.push(message);
        }
    }

    /// Absorbs all errors from another collection.
    pub fn add_error_collection(&mut self, other: &ErrorCollection) {
        for (field, message) in &other.errors {
            self.add_error(field.clone(), message.clone());
        }
        for message in &other.error_messages {
            self.add_error_message(message.clone());
        }
    }

    /// Returns the error for a field, if any.
    #[must_use]
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Returns all field-keyed errors.
    #[must_use]
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Returns the general error messages.
    #[must_use]
    pub fn error_messages(&self) -> &[String] {
        &self.error_messages
    }

    /// Returns `true` if any error (keyed or general) has been added.
    #[must_use]
    pub fn has_any_errors(&self) -> bool {
        !self.errors.is_empty() || !self.error_messages.is_empty()
    }

    /// Total number of errors, keyed and general.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len() + self.error_messages.len()
    }

    /// Returns `true` if the collection holds no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
