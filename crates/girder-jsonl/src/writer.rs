//! JSONL writing operations.
//!
//! This module provides async functionality for writing data in JSONL format
//! with efficient buffering. Each record is serialized to one line of JSON
//! followed by a newline.

use crate::Result;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Async writer for JSONL (JSON Lines) data.
///
/// `JsonlWriter` wraps an async writer in a [`BufWriter`] and serializes
/// one value per line. Call [`flush`](Self::flush) before dropping the
/// writer to ensure buffered data reaches the underlying writer.
///
/// # Examples
///
/// ```no_run
/// use girder_jsonl::JsonlWriter;
/// use tokio::fs::File;
///
/// # async fn example() -> girder_jsonl::Result<()> {
/// let file = File::create("output.jsonl").await?;
/// let mut writer = JsonlWriter::new(file);
/// writer.write_record(&serde_json::json!({"id": 1})).await?;
/// writer.flush().await?;
/// # Ok(())
/// # }
/// ```
pub struct JsonlWriter<W> {
    writer: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin> JsonlWriter<W> {
    /// Creates a new `JsonlWriter` wrapping the given async writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Creates a new `JsonlWriter` with a custom buffer capacity.
    ///
    /// Useful when writing many small records and the default buffer size
    /// is a poor fit for the record length.
    #[must_use]
    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, writer),
        }
    }

    /// Serializes a single value and writes it as one JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the underlying write fails.
    pub async fn write_record<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let mut line = serde_json::to_vec(value)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        Ok(())
    }

    /// Serializes every value from an iterator, one JSON line each.
    ///
    /// # Errors
    ///
    /// Returns the first serialization or IO error encountered. Records
    /// written before the failure may already be buffered.
    pub async fn write_all<T, I>(&mut self, values: I) -> Result<()>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.write_record(&value).await?;
        }
        Ok(())
    }

    /// Flushes buffered data to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying flush fails.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Consumes the writer, returning the underlying buffered writer.
    ///
    /// Does not flush; call [`flush`](Self::flush) first.
    #[must_use]
    pub fn into_inner(self) -> BufWriter<W> {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Record {
        id: u32,
        name: String,
    }

    #[tokio::test]
    async fn write_record_produces_one_line_per_value() {
        let mut writer = JsonlWriter::new(Vec::new());
        writer
            .write_record(&Record {
                id: 1,
                name: "alice".to_string(),
            })
            .await
            .unwrap();
        writer
            .write_record(&Record {
                id: 2,
                name: "bob".to_string(),
            })
            .await
            .unwrap();
        writer.flush().await.unwrap();

        let buf = writer.into_inner().into_inner();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"id":1,"name":"alice"}"#);
        assert_eq!(lines[1], r#"{"id":2,"name":"bob"}"#);
    }

    #[tokio::test]
    async fn write_all_accepts_iterators() {
        let mut writer = JsonlWriter::new(Vec::new());
        let records = (0..5).map(|id| Record {
            id,
            name: format!("user-{id}"),
        });
        writer.write_all(records).await.unwrap();
        writer.flush().await.unwrap();

        let buf = writer.into_inner().into_inner();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 5);
    }

    #[tokio::test]
    async fn empty_input_writes_nothing() {
        let mut writer = JsonlWriter::new(Vec::new());
        writer.write_all(std::iter::empty::<Record>()).await.unwrap();
        writer.flush().await.unwrap();
        assert!(writer.into_inner().into_inner().is_empty());
    }
}
