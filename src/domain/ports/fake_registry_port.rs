//! Fake request registry port definition.

use crate::domain::entities::{FakeRequestKey, FakeResponse};

/// Port for looking up synthetic responses that pre-empt real requests.
/// Implementations must be thread-safe.
pub trait FakeRegistryPort: Send + Sync {
    /// Returns the fake response registered for `key`, if any.
    fn lookup(&self, key: &FakeRequestKey) -> Option<FakeResponse>;

    /// Registers (or overwrites) a fake response.
    fn register(&self, key: FakeRequestKey, response: FakeResponse);

    /// Removes a registration, returning it if present.
    fn remove(&self, key: &FakeRequestKey) -> Option<FakeResponse>;

    /// Removes every registration.
    fn clear(&self);
}
