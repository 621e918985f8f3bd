//! Cache-directory backed destination resolver.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::domain::entities::CacheKey;
use crate::domain::ports::{CacheError, CacheResult, DestinationResolver};

const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "netimage";
const APP_NAME: &str = "netimage";

/// Extension of persisted image files.
pub const CACHE_FILE_EXTENSION: &str = "img";

/// Places every image under a single cache directory.
///
/// Paths are hashed so arbitrary path characters never reach the file system;
/// explicit cache names are stored verbatim under `named/`.
#[derive(Debug, Clone)]
pub struct CacheDirResolver {
    cache_dir: PathBuf,
}

impl CacheDirResolver {
    /// Creates a resolver rooted at `cache_dir`.
    ///
    /// Relative directories are anchored at the current directory so every
    /// destination is absolute.
    ///
    /// # Errors
    /// Returns error if the current directory cannot be read.
    pub fn new(cache_dir: impl Into<PathBuf>) -> CacheResult<Self> {
        let cache_dir = cache_dir.into();
        let cache_dir = if cache_dir.is_absolute() {
            cache_dir
        } else {
            std::env::current_dir()
                .map_err(|e| CacheError::IoError(format!("Failed to read current dir: {e}")))?
                .join(cache_dir)
        };
        Ok(Self { cache_dir })
    }

    /// Returns the root cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

impl DestinationResolver for CacheDirResolver {
    fn destination_for_path(&self, path: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{CACHE_FILE_EXTENSION}", hash_path(path)))
    }

    fn destination_for_cache_name(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir
            .join("named")
            .join(format!("{}.{CACHE_FILE_EXTENSION}", key.as_str()))
    }
}

/// Returns the platform cache directory for images.
#[must_use]
pub fn default_cache_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
        .map(|dirs| dirs.cache_dir().join("images"))
}

fn hash_path(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_path_destination_is_stable() {
        let temp = TempDir::new().unwrap();
        let resolver = CacheDirResolver::new(temp.path()).unwrap();

        let first = resolver.destination_for_path("/users/42/avatar");
        let second = resolver.destination_for_path("/users/42/avatar");
        let other = resolver.destination_for_path("/users/43/avatar");

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert!(first.starts_with(temp.path()));
        assert_eq!(first.extension().and_then(|e| e.to_str()), Some("img"));
    }

    #[test]
    fn test_cache_name_destination() {
        let temp = TempDir::new().unwrap();
        let resolver = CacheDirResolver::new(temp.path()).unwrap();
        let key = CacheKey::from_cache_name("users/42").unwrap();

        let location = resolver.destination_for_cache_name(&key);
        assert_eq!(location, temp.path().join("named").join("users_42.img"));
    }

    #[test]
    fn test_relative_dir_is_made_absolute() {
        let resolver = CacheDirResolver::new("relative-cache").unwrap();
        assert!(resolver.cache_dir().is_absolute());
        assert!(resolver.destination_for_path("/a").is_absolute());
    }
}
