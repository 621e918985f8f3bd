//! Domain types for fetched and cached images.

use std::sync::Arc;

use crate::domain::errors::FetchError;

/// Longest cache name that still fits a 255-byte file name once the
/// `.img` extension is appended.
pub const MAX_CACHE_NAME_BYTES: usize = 251;

/// Key under which a decoded image is stored in the memory cache.
///
/// Derived either from a normalized cache-name override or from the absolute
/// identity of the image's on-disk destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Creates a new `CacheKey` from any string-like input.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Creates a key from an explicit cache-name override.
    ///
    /// Path separators are replaced with `_` so the name can be used as a
    /// single file name.
    ///
    /// # Errors
    /// Returns `FetchError::InvalidCacheName` if the normalized name cannot
    /// name a file: empty, `.`, `..`, longer than [`MAX_CACHE_NAME_BYTES`],
    /// or containing control characters.
    pub fn from_cache_name(name: &str) -> Result<Self, FetchError> {
        let normalized: String = name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();

        if normalized.is_empty()
            || normalized == "."
            || normalized == ".."
            || normalized.len() > MAX_CACHE_NAME_BYTES
            || normalized.chars().any(char::is_control)
        {
            return Err(FetchError::InvalidCacheName {
                name: name.to_string(),
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Where an image was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Served by a registered fake response.
    Fake,
    /// Loaded from in-memory LRU cache.
    MemoryCache,
    /// Loaded from disk cache.
    DiskCache,
    /// Downloaded from network.
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fake => write!(f, "fake"),
            Self::MemoryCache => write!(f, "memory"),
            Self::DiskCache => write!(f, "disk"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// What to do when a disk cache file exists but does not decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptCachePolicy {
    /// Remove the file and fetch the image from the network again.
    #[default]
    Refetch,
    /// Report the corrupt file as the fetch outcome.
    Fail,
}

impl std::fmt::Display for CorruptCachePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Refetch => write!(f, "refetch"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

impl std::str::FromStr for CorruptCachePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "refetch" => Ok(Self::Refetch),
            "fail" => Ok(Self::Fail),
            other => Err(format!("unknown corrupt cache policy: {other}")),
        }
    }
}

/// A decoded image together with the tier that produced it.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Memory cache key the image is (or would be) stored under.
    pub key: CacheKey,
    /// The decoded image.
    pub image: Arc<image::DynamicImage>,
    /// Tier that served the image.
    pub source: ImageSource,
}

/// Result handed to a fetch completion. Exactly one is produced per request.
#[derive(Debug, Clone)]
pub enum DownloadOutcome {
    /// The decoded image.
    Image(Arc<image::DynamicImage>),
    /// The request failed; see [`FetchError::code`] for the status code.
    Failure(FetchError),
}

impl DownloadOutcome {
    /// Returns true if the outcome carries an image.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }

    /// Returns the image, if any.
    #[must_use]
    pub fn image(&self) -> Option<&Arc<image::DynamicImage>> {
        match self {
            Self::Image(img) => Some(img),
            Self::Failure(_) => None,
        }
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&FetchError> {
        match self {
            Self::Image(_) => None,
            Self::Failure(err) => Some(err),
        }
    }
}

impl From<Result<LoadedImage, FetchError>> for DownloadOutcome {
    fn from(result: Result<LoadedImage, FetchError>) -> Self {
        match result {
            Ok(loaded) => Self::Image(loaded.image),
            Err(err) => Self::Failure(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("avatar", "avatar" ; "plain")]
    #[test_case("users/42/avatar", "users_42_avatar" ; "forward_slashes")]
    #[test_case("users\\42", "users_42" ; "back_slashes")]
    #[test_case("/", "_" ; "lone_separator")]
    #[test_case(&"x".repeat(MAX_CACHE_NAME_BYTES), &"x".repeat(MAX_CACHE_NAME_BYTES) ; "longest_allowed")]
    fn test_cache_name_normalization(name: &str, expected: &str) {
        let key = CacheKey::from_cache_name(name).expect("valid cache name");
        assert_eq!(key.as_str(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("." ; "dot")]
    #[test_case(".." ; "dot_dot")]
    #[test_case("a\0b" ; "nul")]
    #[test_case("line\nbreak" ; "control_char")]
    #[test_case(&"x".repeat(MAX_CACHE_NAME_BYTES + 1) ; "too_long")]
    #[test_case(&"é".repeat(126) ; "too_long_multibyte")]
    fn test_invalid_cache_names(name: &str) {
        let err = CacheKey::from_cache_name(name).unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_outcome_from_ok() {
        let loaded = LoadedImage {
            key: CacheKey::new("avatar"),
            image: Arc::new(image::DynamicImage::new_rgb8(4, 4)),
            source: ImageSource::Network,
        };

        let outcome = DownloadOutcome::from(Ok(loaded));
        assert!(outcome.is_image());
        assert_eq!(outcome.image().map(|img| img.width()), Some(4));
        assert!(outcome.failure().is_none());
    }

    #[test]
    fn test_outcome_from_err() {
        let outcome = DownloadOutcome::from(Err(FetchError::Cancelled));
        assert!(!outcome.is_image());
        assert_eq!(outcome.failure().map(FetchError::code), Some(-999));
    }
}
