//! Disk persistence of raw image bytes at resolver-chosen locations.
//!
//! Every operation comes in an async flavour (tokio fs / blocking pool) and a
//! `_blocking` flavour used when fetches run inline.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, trace, warn};

use crate::domain::ports::{CacheError, CacheResult};

/// Checks if a cache file exists at `location`.
pub async fn contains(location: &Path) -> bool {
    fs::try_exists(location).await.unwrap_or(false)
}

/// Checks if a cache file exists at `location` without yielding.
#[must_use]
pub fn contains_blocking(location: &Path) -> bool {
    location.try_exists().unwrap_or(false)
}

/// Reads raw image bytes from `location`.
///
/// # Errors
/// Returns error if the file cannot be read.
pub async fn read_bytes(location: &Path) -> CacheResult<Vec<u8>> {
    let bytes = fs::read(location)
        .await
        .map_err(|e| CacheError::IoError(format!("Failed to read cache file: {e}")))?;
    trace!(path = %location.display(), size = bytes.len(), "Disk cache hit");
    Ok(bytes)
}

/// Reads raw image bytes from `location` on the calling thread.
///
/// # Errors
/// Returns error if the file cannot be read.
pub fn read_bytes_blocking(location: &Path) -> CacheResult<Vec<u8>> {
    let bytes = std::fs::read(location)
        .map_err(|e| CacheError::IoError(format!("Failed to read cache file: {e}")))?;
    trace!(path = %location.display(), size = bytes.len(), "Disk cache hit");
    Ok(bytes)
}

/// Replaces the file at `location` with `bytes`.
///
/// The bytes land in a temporary file next to the destination which is then
/// renamed over it, so readers never observe a partial image.
///
/// # Errors
/// Returns error if the directory, temp file or rename fails.
pub async fn write_atomic(location: PathBuf, bytes: bytes::Bytes) -> CacheResult<()> {
    tokio::task::spawn_blocking(move || write_atomic_blocking(&location, &bytes))
        .await
        .map_err(|e| CacheError::IoError(format!("Write task panicked: {e}")))?
}

/// Blocking variant of [`write_atomic`].
///
/// # Errors
/// Returns error if the directory, temp file or rename fails.
pub fn write_atomic_blocking(location: &Path, bytes: &[u8]) -> CacheResult<()> {
    let dir = location
        .parent()
        .ok_or_else(|| CacheError::IoError("Cache location has no parent".to_string()))?;

    std::fs::create_dir_all(dir)
        .map_err(|e| CacheError::IoError(format!("Failed to create cache dir: {e}")))?;

    let mut file = NamedTempFile::new_in(dir)
        .map_err(|e| CacheError::IoError(format!("Failed to create cache file: {e}")))?;

    file.write_all(bytes)
        .map_err(|e| CacheError::IoError(format!("Failed to write cache file: {e}")))?;

    file.flush()
        .map_err(|e| CacheError::IoError(format!("Failed to flush cache file: {e}")))?;

    file.persist(location)
        .map_err(|e| CacheError::IoError(format!("Failed to persist cache file: {}", e.error)))?;

    debug!(path = %location.display(), size = bytes.len(), "Stored image in disk cache");
    Ok(())
}

/// Removes the file at `location`, ignoring a missing file.
pub async fn remove(location: &Path) {
    if let Err(e) = fs::remove_file(location).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %location.display(), error = %e, "Failed to remove cache file");
        }
    } else {
        debug!(path = %location.display(), "Removed cache file");
    }
}

/// Blocking variant of [`remove`].
pub fn remove_blocking(location: &Path) {
    if let Err(e) = std::fs::remove_file(location) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %location.display(), error = %e, "Failed to remove cache file");
        }
    } else {
        debug!(path = %location.display(), "Removed cache file");
    }
}
