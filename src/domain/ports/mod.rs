mod activity_port;
mod fake_registry_port;
mod image_cache_port;
mod resolver_port;
mod transport_port;

pub use activity_port::ActivityIndicator;
pub use fake_registry_port::FakeRegistryPort;
pub use image_cache_port::{CacheError, CacheResult, ImageCachePort};
pub use resolver_port::{DestinationResolver, RequestUrlResolver};
pub use transport_port::{DownloadTransport, TransportError, TransportResponse};
