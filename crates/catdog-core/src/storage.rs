//! Helpers for saving fetched content to disk.
//!
//! Callers may persist downloaded image bytes or JSON-serialized entity
//! state into a target directory. The directory must already exist; nothing
//! here creates directories on the caller's behalf.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Verify that `dir` exists and is a directory.
///
/// # Errors
///
/// Returns [`Error::NotADirectory`] otherwise.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(Error::NotADirectory(dir.to_path_buf()))
    }
}

/// Write binary content under `dir` and return the written path.
///
/// # Errors
///
/// Returns [`Error::NotADirectory`] for an invalid target directory and
/// [`Error::Io`] when the write fails.
pub async fn save_bytes(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let target = dir.join(file_name);
    tokio::fs::write(&target, bytes).await?;
    debug!(path = %target.display(), size = bytes.len(), "saved binary content");
    Ok(target)
}

/// Write an entity as pretty-printed JSON under `dir` and return the
/// written path.
///
/// # Errors
///
/// Returns [`Error::NotADirectory`] for an invalid target directory,
/// [`Error::Parse`] when serialization fails, and [`Error::Io`] when the
/// write fails.
pub async fn save_json<T>(dir: &Path, file_name: &str, entity: &T) -> Result<PathBuf>
where
    T: Serialize + ?Sized,
{
    ensure_dir(dir)?;
    let target = dir.join(file_name);
    let payload = serde_json::to_vec_pretty(entity)?;
    tokio::fs::write(&target, payload).await?;
    debug!(path = %target.display(), "saved entity state");
    Ok(target)
}
