//! Domain layer with core image-fetch entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{CacheKey, DownloadOutcome, ImageSource, LoadedImage};
pub use errors::FetchError;
pub use ports::{DownloadTransport, FakeRegistryPort, ImageCachePort};
