//! JSONL reading operations.
//!
//! This module provides async functionality for reading JSONL files
//! line-by-line with buffering and line-number tracking for error
//! reporting. Two loading modes are supported:
//!
//! - **Strict** ([`read_jsonl`]): the first malformed line aborts the read.
//! - **Resilient** ([`read_jsonl_resilient`]): malformed lines are skipped
//!   and reported as [`Warning`]s so one corrupt record does not make the
//!   rest of the file unreadable.

use crate::warning::{Warning, WarningCollector};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async reader for JSONL (JSON Lines) data.
///
/// Wraps an async reader in a [`BufReader`] and deserializes one value per
/// line. Line numbers are 1-based and reported in parse errors.
///
/// Empty lines (after trimming whitespace) are skipped; they commonly
/// appear as trailing newlines in hand-edited files.
pub struct JsonlReader<R> {
    reader: BufReader<R>,
    line_number: usize,
    buf: String,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buf: String::new(),
        }
    }

    /// Returns the 1-based line number of the last line read.
    ///
    /// Returns 0 before any lines have been read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next non-empty line and deserializes it.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on read failure, or [`Error::JsonAtLine`] when
    /// a line is not valid JSON for `T`.
    pub async fn read_record<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        loop {
            self.buf.clear();
            let bytes = self.reader.read_line(&mut self.buf).await?;
            if bytes == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }

            return serde_json::from_str(line)
                .map(Some)
                .map_err(|error| Error::JsonAtLine {
                    line_number: self.line_number,
                    error,
                });
        }
    }

    /// Reads and deserializes every remaining record.
    ///
    /// # Errors
    ///
    /// Fails on the first IO or parse error; see [`read_record`](Self::read_record).
    pub async fn read_all<T: DeserializeOwned>(&mut self) -> Result<Vec<T>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record().await? {
            records.push(record);
        }
        Ok(records)
    }

    /// Reads every remaining record, skipping malformed lines.
    ///
    /// Each skipped line is recorded in the collector as a
    /// [`Warning::MalformedJson`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] only; parse failures never abort the read.
    pub async fn read_all_resilient<T: DeserializeOwned>(
        &mut self,
        warnings: &WarningCollector,
    ) -> Result<Vec<T>> {
        let mut records = Vec::new();
        loop {
            match self.read_record().await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => break,
                Err(Error::JsonAtLine { line_number, error }) => {
                    warnings.add(Warning::MalformedJson {
                        line_number,
                        error: error.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }
}

/// Reads an entire JSONL file strictly.
///
/// # Errors
///
/// Fails if the file cannot be opened or any line fails to parse.
pub async fn read_jsonl<T, P>(path: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref()).await?;
    JsonlReader::new(file).read_all().await
}

/// Reads an entire JSONL file, collecting warnings for malformed lines.
///
/// Returns the successfully parsed records together with any warnings.
/// An empty or all-corrupt file yields an empty vector, not an error.
///
/// # Errors
///
/// Fails only if the file cannot be opened or an IO error occurs mid-read.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref()).await?;
    let collector = WarningCollector::new();
    let records = JsonlReader::new(file)
        .read_all_resilient(&collector)
        .await?;
    Ok((records, collector.into_warnings()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;
    use std::io::Cursor;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Record {
        id: u32,
    }

    #[tokio::test]
    async fn read_record_tracks_line_numbers() {
        let data = Cursor::new(b"{\"id\":1}\n{\"id\":2}\n".to_vec());
        let mut reader = JsonlReader::new(data);
        assert_eq!(reader.line_number(), 0);

        let first: Option<Record> = reader.read_record().await.unwrap();
        assert_eq!(first, Some(Record { id: 1 }));
        assert_eq!(reader.line_number(), 1);

        let second: Option<Record> = reader.read_record().await.unwrap();
        assert_eq!(second, Some(Record { id: 2 }));
        assert_eq!(reader.line_number(), 2);

        let end: Option<Record> = reader.read_record().await.unwrap();
        assert!(end.is_none());
    }

    #[rstest]
    #[case::between_records("{\"id\":1}\n\n   \n{\"id\":2}\n")]
    #[case::trailing_newlines("{\"id\":1}\n{\"id\":2}\n\n\n")]
    #[case::crlf_endings("{\"id\":1}\r\n{\"id\":2}\r\n")]
    #[tokio::test]
    async fn blank_lines_and_line_endings_are_tolerated(#[case] input: &str) {
        let data = Cursor::new(input.as_bytes().to_vec());
        let mut reader = JsonlReader::new(data);
        let records: Vec<Record> = reader.read_all().await.unwrap();
        assert_eq!(records, vec![Record { id: 1 }, Record { id: 2 }]);
    }

    #[tokio::test]
    async fn strict_read_fails_with_line_number() {
        let data = Cursor::new(b"{\"id\":1}\nnot json\n".to_vec());
        let mut reader = JsonlReader::new(data);
        let result: Result<Vec<Record>> = reader.read_all().await;
        match result {
            Err(Error::JsonAtLine { line_number, .. }) => assert_eq!(line_number, 2),
            other => panic!("expected JsonAtLine error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resilient_read_skips_malformed_lines() {
        let data = Cursor::new(b"{\"id\":1}\ngarbage\n{\"id\":3}\n".to_vec());
        let mut reader = JsonlReader::new(data);
        let collector = WarningCollector::new();
        let records: Vec<Record> = reader.read_all_resilient(&collector).await.unwrap();

        assert_eq!(records, vec![Record { id: 1 }, Record { id: 3 }]);
        let warnings = collector.into_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line_number(), 2);
    }

    #[tokio::test]
    async fn resilient_read_of_all_corrupt_input_yields_empty() {
        let data = Cursor::new(b"one\ntwo\nthree\n".to_vec());
        let mut reader = JsonlReader::new(data);
        let collector = WarningCollector::new();
        let records: Vec<Record> = reader.read_all_resilient(&collector).await.unwrap();
        assert!(records.is_empty());
        assert_eq!(collector.len(), 3);
    }
}
