//! Infrastructure layer with adapters for the coordinator's ports.

/// Network activity flag.
pub mod activity;
/// Fetcher configuration.
pub mod config;
/// In-memory fake response registry.
pub mod fake_registry;
/// HTTP transport and URL resolution.
pub mod http;
/// Image handling (caching, persistence, decoding).
pub mod image;

pub use activity::NetworkActivityFlag;
pub use config::{AppConfig, CliArgs, ConfigError, LogLevel, StorageManager};
pub use fake_registry::InMemoryFakeRegistry;
pub use http::{BaseUrlResolver, ReqwestTransport};
pub use self::image::{CacheDirResolver, CacheStats, MemoryImageCache};
