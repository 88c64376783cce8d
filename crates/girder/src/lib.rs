//! Girder - bounded per-user history tracking.
//!
//! This crate provides both a CLI application and a library for recording
//! and querying a user's recent interactions (viewed issues, used searches,
//! visited projects) with a per-category cap, most-recent-first ordering,
//! and write-through JSONL persistence.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod filter;
pub mod history;
pub mod import;
pub mod messages;

// Public CLI module (needed by binary)
pub mod cli;

// Command implementations
pub mod commands;

// Application context
pub mod app;

// Output formatting
pub mod output;

// Internal modules (not exposed as public API)
pub(crate) mod config;

pub use config::{GirderConfig, StorageConfig};
