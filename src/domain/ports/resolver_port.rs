//! Path resolution ports.

use std::path::PathBuf;

use crate::domain::entities::CacheKey;

/// Resolves a logical image path to the URL it is downloaded from.
pub trait RequestUrlResolver: Send + Sync {
    /// Returns the absolute request URL for `path`.
    fn request_url(&self, path: &str) -> String;
}

/// Resolves where fetched image bytes are persisted on disk.
pub trait DestinationResolver: Send + Sync {
    /// Returns the absolute on-disk location for `path`.
    fn destination_for_path(&self, path: &str) -> PathBuf;

    /// Returns the absolute on-disk location for an explicit cache name.
    fn destination_for_cache_name(&self, key: &CacheKey) -> PathBuf;
}
