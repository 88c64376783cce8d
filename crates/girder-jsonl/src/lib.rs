//! JSON Lines persistence primitives for girder.
//!
//! This crate provides buffered async reading and writing of JSONL
//! (JSON Lines) data, crash-safe atomic file replacement, and resilient
//! loading that collects per-line warnings instead of aborting on the
//! first malformed record.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod warning;
pub mod writer;

pub use atomic::{write_jsonl_atomic, write_jsonl_atomic_iter};
pub use error::{Error, Result};
pub use reader::{read_jsonl, read_jsonl_resilient, JsonlReader};
pub use warning::{Warning, WarningCollector};
pub use writer::JsonlWriter;
