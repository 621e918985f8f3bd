//! Bounded LRU of decoded images.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::DynamicImage;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::CacheKey;
use crate::domain::ports::ImageCachePort;

/// Default maximum number of images to cache in memory.
pub const DEFAULT_CACHE_SIZE: usize = 50;

/// Memory tier of the fetch pipeline.
///
/// Entries are shared `Arc`s, so a hit never copies pixel data. The lock is
/// never held across an await point.
pub struct MemoryImageCache {
    entries: Mutex<LruCache<CacheKey, Arc<DynamicImage>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl MemoryImageCache {
    /// Creates a cache holding at most `capacity` images (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Returns hit, miss and eviction counters plus current occupancy.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: entries.len(),
            capacity: entries.cap().get(),
        }
    }
}

/// Snapshot of memory tier counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from memory.
    pub hits: u64,
    /// Lookups that fell through to the disk or network tier.
    pub misses: u64,
    /// Entries dropped to make room for newer ones.
    pub evictions: u64,
    /// Images currently held.
    pub size: usize,
    /// Maximum number of images held.
    pub capacity: usize,
}

impl CacheStats {
    /// Share of lookups answered from memory, in percent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 * 100.0 / total as f64
        }
    }
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} images, {:.1}% hit rate ({} hits, {} misses, {} evicted)",
            self.size,
            self.capacity,
            self.hit_rate(),
            self.hits,
            self.misses,
            self.evictions
        )
    }
}

#[async_trait::async_trait]
impl ImageCachePort for MemoryImageCache {
    async fn get(&self, key: &CacheKey) -> Option<Arc<DynamicImage>> {
        let found = self.entries.lock().get(key).cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        trace!(key = %key, hit = found.is_some(), "Memory cache lookup");
        found
    }

    async fn put(&self, key: CacheKey, image: Arc<DynamicImage>) {
        let displaced = self.entries.lock().push(key.clone(), image);
        match displaced {
            Some((old, _)) if old != key => {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, evicted = %old, "Stored image in memory cache");
            }
            _ => debug!(key = %key, "Stored image in memory cache"),
        }
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }

    async fn clear(&self) {
        self.entries.lock().clear();
        debug!("Cleared memory image cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> Arc<DynamicImage> {
        Arc::new(DynamicImage::new_rgb8(1, 1))
    }

    #[tokio::test]
    async fn test_hit_returns_shared_image() {
        let cache = MemoryImageCache::new(4);
        let key = CacheKey::new("avatar");
        let img = Arc::new(DynamicImage::new_rgb8(100, 100));

        cache.put(key.clone(), img.clone()).await;
        let retrieved = cache.get(&key).await.unwrap();

        assert!(Arc::ptr_eq(&retrieved, &img));
        assert!(cache.get(&CacheKey::new("other")).await.is_none());
    }

    #[tokio::test]
    async fn test_least_recently_used_is_evicted() {
        let cache = MemoryImageCache::new(2);
        let (k1, k2, k3) = (CacheKey::new("k1"), CacheKey::new("k2"), CacheKey::new("k3"));

        cache.put(k1.clone(), pixel()).await;
        cache.put(k2.clone(), pixel()).await;
        cache.get(&k1).await;
        cache.put(k3.clone(), pixel()).await;

        assert!(cache.get(&k2).await.is_none());
        assert!(cache.get(&k1).await.is_some());
        assert!(cache.get(&k3).await.is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_replacing_a_key_is_not_an_eviction() {
        let cache = MemoryImageCache::new(2);
        let key = CacheKey::new("k");

        cache.put(key.clone(), pixel()).await;
        cache.put(key.clone(), Arc::new(DynamicImage::new_rgb8(3, 3))).await;

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.get(&key).await.map(|img| img.width()), Some(3));
    }

    #[tokio::test]
    async fn test_stats_and_clear() {
        let cache = MemoryImageCache::new(10);
        let key = CacheKey::new("k1");
        cache.put(key.clone(), pixel()).await;

        cache.get(&key).await;
        cache.get(&CacheKey::new("missing")).await;

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.size, stats.capacity), (1, 1, 1, 10));
        assert_eq!(
            stats.to_string(),
            "1/10 images, 50.0% hit rate (1 hits, 1 misses, 0 evicted)"
        );

        cache.clear().await;
        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        assert_eq!(MemoryImageCache::new(0).stats().capacity, 1);
    }
}
