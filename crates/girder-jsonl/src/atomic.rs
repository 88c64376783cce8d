//! Atomic write operations for JSONL files.
//!
//! Writes go to a temporary file next to the target, which is then renamed
//! over the target. Renames within a filesystem are atomic on POSIX, so a
//! crash mid-write leaves the original file intact; at worst a stale
//! `.tmp` file is left behind and overwritten by the next successful write.

use crate::{JsonlWriter, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Atomically writes a slice of values to a JSONL file.
///
/// The target file is either fully replaced or left unchanged; it is never
/// observed in a partially-written state.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, any value
/// fails to serialize, an IO error occurs during writing, or the rename
/// fails (for example a cross-filesystem move).
pub async fn write_jsonl_atomic<T, P>(path: P, values: &[T]) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_jsonl_atomic_iter(path, values.iter()).await
}

/// Atomically writes an iterator of values to a JSONL file.
///
/// Like [`write_jsonl_atomic`] but avoids collecting into a slice first.
///
/// # Errors
///
/// See [`write_jsonl_atomic`].
pub async fn write_jsonl_atomic_iter<T, I, P>(path: P, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    if let Err(e) = write_to_temp_file(&temp_path, values).await {
        // Best-effort cleanup; the original file is untouched.
        if let Err(cleanup_err) = tokio::fs::remove_file(&temp_path).await {
            if cleanup_err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    temp_file = %temp_path.display(),
                    error = %cleanup_err,
                    "Failed to remove temporary file after write error"
                );
            }
        }
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Derives the temporary path by appending `.tmp` to the file name.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => std::ffi::OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}

async fn write_to_temp_file<T, I>(temp_path: &Path, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(temp_path).await?;
    let mut writer = JsonlWriter::new(file);
    writer.write_all(values).await?;
    writer.flush().await?;
    Ok(())
}
