//! Image download coordinator.
//!
//! Answers an image path from, in order: a registered fake response, the
//! memory cache, the disk cache, and finally the network. Network results are
//! persisted to disk and stored in memory before the completion runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::execution::ExecutionMode;
use crate::domain::entities::{
    AuthToken, CacheKey, CorruptCachePolicy, DownloadOutcome, DownloadRequest, FakeRequestKey,
    FakeResponse, ImageSource, InFlightRequestIdentity, LoadedImage,
};

use crate::domain::errors::{FetchError, is_success_status};
use crate::domain::ports::{
    ActivityIndicator, DestinationResolver, DownloadTransport, FakeRegistryPort, ImageCachePort,
    RequestUrlResolver, TransportError, TransportResponse,
};
use crate::infrastructure::image::{decode_image, decode_image_blocking_pool, disk_cache, encode_png};

/// Collaborators the coordinator consumes.
#[derive(Clone)]
pub struct CoordinatorPorts {
    /// Network transport.
    pub transport: Arc<dyn DownloadTransport>,
    /// Path to request URL resolution.
    pub urls: Arc<dyn RequestUrlResolver>,
    /// Path or cache name to on-disk location resolution.
    pub destinations: Arc<dyn DestinationResolver>,
    /// Decoded image cache.
    pub memory_cache: Arc<dyn ImageCachePort>,
    /// Fake response registry.
    pub fakes: Arc<dyn FakeRegistryPort>,
    /// Network activity signal.
    pub activity: Arc<dyn ActivityIndicator>,
}

/// Coordinator behaviour switches.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Scheduling regime for `fetch_image`.
    pub mode: ExecutionMode,
    /// Handling of undecodable disk cache files.
    pub corrupt_cache_policy: CorruptCachePolicy,
    /// Bearer token attached to downloads.
    pub token: Option<AuthToken>,
}

impl CoordinatorOptions {
    /// Options for the inline regime with defaults otherwise.
    #[must_use]
    pub fn inline() -> Self {
        Self {
            mode: ExecutionMode::Inline,
            corrupt_cache_policy: CorruptCachePolicy::default(),
            token: None,
        }
    }

    /// Options for the background regime with defaults otherwise.
    #[must_use]
    pub fn background(completions: super::execution::CompletionSender) -> Self {
        Self {
            mode: ExecutionMode::Background(completions),
            ..Self::inline()
        }
    }
}

/// Three-tier image fetch coordinator.
#[derive(Clone)]
pub struct DownloadCoordinator {
    shared: Arc<Shared>,
}

struct InFlightEntry {
    generation: u64,
    token: CancellationToken,
    waiters: usize,
}

/// State shared with spawned fetch tasks.
struct Shared {
    ports: CoordinatorPorts,
    mode: ExecutionMode,
    corrupt_cache_policy: CorruptCachePolicy,
    token: RwLock<Option<AuthToken>>,
    in_flight: Mutex<HashMap<InFlightRequestIdentity, InFlightEntry>>,
    generations: AtomicU64,
}

impl std::fmt::Debug for DownloadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadCoordinator")
            .field("mode", &self.shared.mode)
            .field("corrupt_cache_policy", &self.shared.corrupt_cache_policy)
            .finish_non_exhaustive()
    }
}

impl DownloadCoordinator {
    /// Creates a coordinator over the given collaborators.
    #[must_use]
    pub fn new(ports: CoordinatorPorts, options: CoordinatorOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                ports,
                mode: options.mode,
                corrupt_cache_policy: options.corrupt_cache_policy,
                token: RwLock::new(options.token),
                in_flight: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Fetches an image and hands the outcome to `completion` exactly once.
    ///
    /// In the background regime the fetch is spawned and this returns
    /// immediately; the completion runs when the main-context queue is
    /// drained. In the inline regime the completion has already run when this
    /// returns.
    pub async fn fetch_image<F>(&self, path: &str, cache_name: Option<&str>, completion: F)
    where
        F: FnOnce(DownloadOutcome) + Send + 'static,
    {
        match &self.shared.mode {
            ExecutionMode::Inline => {
                let outcome = DownloadOutcome::from(self.shared.fetch(path, cache_name).await);
                completion(outcome);
            }
            ExecutionMode::Background(completions) => {
                let shared = self.shared.clone();
                let completions = completions.clone();
                let path = path.to_string();
                let cache_name = cache_name.map(str::to_string);
                tokio::spawn(async move {
                    let outcome =
                        DownloadOutcome::from(shared.fetch(&path, cache_name.as_deref()).await);
                    completions.post(path, outcome, Box::new(completion));
                });
            }
        }
    }

    /// Fetches an image, reporting which tier served it.
    ///
    /// # Errors
    /// Returns the failure that `fetch_image` would deliver.
    pub async fn fetch(
        &self,
        path: &str,
        cache_name: Option<&str>,
    ) -> Result<LoadedImage, FetchError> {
        self.shared.fetch(path, cache_name).await
    }

    /// Cancels the in-flight download for `path`, if there is one.
    ///
    /// Returns true if a running download was cancelled. The cancelled fetch
    /// completes with `FetchError::Cancelled`.
    pub fn cancel_download(&self, path: &str) -> bool {
        let identity = self.identity_for(path);
        let entry = self.shared.in_flight.lock().remove(&identity);
        if let Some(entry) = entry {
            entry.token.cancel();
            debug!(path = %path, identity = %identity, "Cancelled image download");
            true
        } else {
            trace!(path = %path, "No in-flight download to cancel");
            false
        }
    }

    /// Registers a fake response for a GET of `path`.
    ///
    /// A `None` image registers a response without payload; fetching it
    /// fails with `FetchError::FakeUndecodable` unless `status` is a failure.
    ///
    /// # Errors
    /// Returns error if the image cannot be encoded.
    pub fn register_fake_image(
        &self,
        path: &str,
        fake_image: Option<&image::DynamicImage>,
        status: u16,
    ) -> image::ImageResult<()> {
        let payload = fake_image.map(encode_png).transpose()?;
        self.register_fake_response(path, FakeResponse::new(status, payload));
        Ok(())
    }

    /// Registers a raw fake response for a GET of `path`.
    pub fn register_fake_response(&self, path: &str, response: FakeResponse) {
        self.shared
            .ports
            .fakes
            .register(FakeRequestKey::get(path), response);
    }

    /// Replaces the bearer token attached to downloads.
    pub fn set_token(&self, token: Option<AuthToken>) {
        *self.shared.token.write() = token;
    }

    /// Stops attaching a bearer token.
    pub fn clear_token(&self) {
        self.set_token(None);
    }

    /// Returns true if a download for `path` is on the wire.
    #[must_use]
    pub fn is_in_flight(&self, path: &str) -> bool {
        self.shared
            .in_flight
            .lock()
            .contains_key(&self.identity_for(path))
    }

    /// Returns the number of distinct downloads on the wire.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.shared.in_flight.lock().len()
    }

    /// Drops every decoded image held in memory.
    pub async fn clear_memory_cache(&self) {
        self.shared.ports.memory_cache.clear().await;
    }

    fn identity_for(&self, path: &str) -> InFlightRequestIdentity {
        InFlightRequestIdentity::download(self.shared.ports.urls.request_url(path))
    }
}

/// Unregisters an in-flight download when dropped.
struct InFlightGuard<'a> {
    shared: &'a Shared,
    identity: InFlightRequestIdentity,
    generation: u64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.shared.in_flight.lock();
        let finished = match in_flight.get_mut(&self.identity) {
            Some(entry) if entry.generation == self.generation => {
                entry.waiters -= 1;
                entry.waiters == 0
            }
            _ => false,
        };
        if finished {
            in_flight.remove(&self.identity);
        }
    }
}

/// Keeps the activity indicator raised until dropped.
struct ActivityGuard<'a> {
    indicator: &'a dyn ActivityIndicator,
}

impl<'a> ActivityGuard<'a> {
    fn show(indicator: &'a dyn ActivityIndicator) -> Self {
        indicator.set_visible(true);
        Self { indicator }
    }
}

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        self.indicator.set_visible(false);
    }
}

impl Shared {
    async fn fetch(&self, path: &str, cache_name: Option<&str>) -> Result<LoadedImage, FetchError> {
        let (key, location) = self.resolve_destination(path, cache_name)?;

        if let Some(fake) = self.ports.fakes.lookup(&FakeRequestKey::get(path)) {
            debug!(path = %path, status = fake.status, "Answering from fake response");
            return answer_fake(key, &fake);
        }

        if let Some(image) = self.ports.memory_cache.get(&key).await {
            return Ok(LoadedImage {
                key,
                image,
                source: ImageSource::MemoryCache,
            });
        }

        match self.read_disk(&key, &location).await {
            Ok(Some(loaded)) => return Ok(loaded),
            Ok(None) => {}
            Err(err) => match self.corrupt_cache_policy {
                CorruptCachePolicy::Fail => {
                    warn!(path = %path, error = %err, "Disk cache file is unusable");
                    return Err(err);
                }
                CorruptCachePolicy::Refetch => {
                    warn!(path = %path, error = %err, "Disk cache file is unusable, refetching");
                    if self.mode.is_inline() {
                        disk_cache::remove_blocking(&location);
                    } else {
                        disk_cache::remove(&location).await;
                    }
                }
            },
        }

        self.fetch_network(path, key, location).await
    }

    fn resolve_destination(
        &self,
        path: &str,
        cache_name: Option<&str>,
    ) -> Result<(CacheKey, PathBuf), FetchError> {
        if let Some(name) = cache_name {
            let key = CacheKey::from_cache_name(name)?;
            let location = self.ports.destinations.destination_for_cache_name(&key);
            Ok((key, location))
        } else {
            let location = self.ports.destinations.destination_for_path(path);
            let key = CacheKey::new(location.to_string_lossy());
            Ok((key, location))
        }
    }

    async fn read_disk(
        &self,
        key: &CacheKey,
        location: &Path,
    ) -> Result<Option<LoadedImage>, FetchError> {
        let decoded = if self.mode.is_inline() {
            if !disk_cache::contains_blocking(location) {
                return Ok(None);
            }
            let bytes = disk_cache::read_bytes_blocking(location)
                .map_err(|e| FetchError::corrupt_cache(location, e.to_string()))?;
            decode_image(&bytes)
        } else {
            if !disk_cache::contains(location).await {
                return Ok(None);
            }
            let bytes = disk_cache::read_bytes(location)
                .await
                .map_err(|e| FetchError::corrupt_cache(location, e.to_string()))?;
            decode_image_blocking_pool(bytes).await
        };

        let image = Arc::new(decoded.map_err(|e| FetchError::corrupt_cache(location, e))?);
        self.ports
            .memory_cache
            .put(key.clone(), image.clone())
            .await;
        debug!(key = %key, "Loaded image from disk cache");

        Ok(Some(LoadedImage {
            key: key.clone(),
            image,
            source: ImageSource::DiskCache,
        }))
    }

    async fn fetch_network(
        &self,
        path: &str,
        key: CacheKey,
        location: PathBuf,
    ) -> Result<LoadedImage, FetchError> {
        let url = self.ports.urls.request_url(path);
        let token = self.token.read().clone();
        let request = DownloadRequest::get(url.clone(), token);

        let _activity = self
            .mode
            .is_background()
            .then(|| ActivityGuard::show(self.ports.activity.as_ref()));

        debug!(path = %path, url = %url, "Downloading image from network");

        let result = {
            let (guard, cancel) = self.begin_in_flight(request.identity());
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => Err(TransportError::Cancelled),
                result = self.ports.transport.download(&request) => result,
            };
            drop(guard);
            result
        };

        self.finish_network(&url, key, location, result).await
    }

    fn begin_in_flight(
        &self,
        identity: InFlightRequestIdentity,
    ) -> (InFlightGuard<'_>, CancellationToken) {
        let mut in_flight = self.in_flight.lock();
        let entry = in_flight
            .entry(identity.clone())
            .or_insert_with(|| InFlightEntry {
                generation: self.generations.fetch_add(1, Ordering::Relaxed),
                token: CancellationToken::new(),
                waiters: 0,
            });
        entry.waiters += 1;
        let guard = InFlightGuard {
            shared: self,
            identity,
            generation: entry.generation,
        };
        (guard, entry.token.clone())
    }

    async fn finish_network(
        &self,
        url: &str,
        key: CacheKey,
        location: PathBuf,
        result: Result<TransportResponse, TransportError>,
    ) -> Result<LoadedImage, FetchError> {
        let response = match result {
            Ok(response) => response,
            Err(TransportError::Cancelled) => {
                debug!(url = %url, "Image download cancelled");
                return Err(FetchError::Cancelled);
            }
            Err(TransportError::Failed(message)) => {
                warn!(url = %url, error = %message, "Image download failed");
                return Err(FetchError::transport(url, message));
            }
        };

        let decoded = if self.mode.is_inline() {
            decode_image(&response.body)
        } else {
            decode_image_blocking_pool(response.body.clone()).await
        };

        let image = match decoded {
            Ok(image) => Arc::new(image),
            Err(e) if !is_success_status(response.status) => {
                warn!(url = %url, status = response.status, size = response.body.len(), error = %e, "Image download rejected");
                return Err(FetchError::http(response.status));
            }
            Err(e) => {
                warn!(url = %url, status = response.status, size = response.body.len(), error = %e, "Downloaded bytes are not an image");
                return Err(FetchError::Undecodable {
                    url: url.to_string(),
                });
            }
        };

        let persisted = if self.mode.is_inline() {
            disk_cache::write_atomic_blocking(&location, &response.body)
        } else {
            disk_cache::write_atomic(location.clone(), response.body.clone()).await
        };
        if let Err(e) = persisted {
            warn!(url = %url, path = %location.display(), error = %e, "Failed to cache to disk");
        }

        self.ports
            .memory_cache
            .put(key.clone(), image.clone())
            .await;

        debug!(key = %key, source = "network", "Image loaded successfully");

        Ok(LoadedImage {
            key,
            image,
            source: ImageSource::Network,
        })
    }
}

fn answer_fake(key: CacheKey, fake: &FakeResponse) -> Result<LoadedImage, FetchError> {
    if !is_success_status(fake.status) {
        return Err(FetchError::fake(fake.status));
    }

    let image = fake
        .payload
        .as_deref()
        .and_then(|bytes| decode_image(bytes).ok())
        .ok_or(FetchError::FakeUndecodable {
            status: fake.status,
        })?;

    Ok(LoadedImage {
        key,
        image: Arc::new(image),
        source: ImageSource::Fake,
    })
}
