//! Image handling infrastructure.
//!
//! This module provides:
//! - Memory caching with LRU eviction
//! - Disk persistence of fetched bytes
//! - Destination resolution under a cache directory
//! - Image decoding helpers

pub mod decode;
pub mod destination;
pub mod disk_cache;
pub mod memory_cache;

pub use decode::{decode_image, decode_image_blocking_pool, encode_png};
pub use destination::{CacheDirResolver, default_cache_dir};
pub use memory_cache::{CacheStats, MemoryImageCache};
