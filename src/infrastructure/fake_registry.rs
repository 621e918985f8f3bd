//! In-memory fake response registry.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::domain::entities::{FakeRequestKey, FakeResponse};
use crate::domain::ports::FakeRegistryPort;

/// Thread-safe map of fake responses.
#[derive(Debug, Default)]
pub struct InMemoryFakeRegistry {
    responses: RwLock<HashMap<FakeRequestKey, FakeResponse>>,
}

impl InMemoryFakeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.responses.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FakeRegistryPort for InMemoryFakeRegistry {
    fn lookup(&self, key: &FakeRequestKey) -> Option<FakeResponse> {
        self.responses.read().get(key).cloned()
    }

    fn register(&self, key: FakeRequestKey, response: FakeResponse) {
        debug!(method = %key.method, path = %key.path, status = response.status, "Registered fake response");
        self.responses.write().insert(key, response);
    }

    fn remove(&self, key: &FakeRequestKey) -> Option<FakeResponse> {
        self.responses.write().remove(key)
    }

    fn clear(&self) {
        self.responses.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_register_overwrites() {
        let registry = InMemoryFakeRegistry::new();
        let key = FakeRequestKey::get("/avatar");

        registry.register(key.clone(), FakeResponse::new(200, Some(Bytes::from_static(b"a"))));
        registry.register(key.clone(), FakeResponse::new(404, None));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(&key), Some(FakeResponse::new(404, None)));
    }

    #[test]
    fn test_lookup_is_per_path() {
        let registry = InMemoryFakeRegistry::new();
        registry.register(FakeRequestKey::get("/avatar"), FakeResponse::new(200, None));

        assert!(registry.lookup(&FakeRequestKey::get("/banner")).is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let registry = InMemoryFakeRegistry::new();
        registry.register(FakeRequestKey::get("/a"), FakeResponse::new(200, None));
        registry.register(FakeRequestKey::get("/b"), FakeResponse::new(200, None));

        assert!(registry.remove(&FakeRequestKey::get("/a")).is_some());
        assert!(registry.remove(&FakeRequestKey::get("/a")).is_none());

        registry.clear();
        assert!(registry.is_empty());
    }
}
