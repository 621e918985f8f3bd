//! Synthetic responses registered to stand in for network requests.

use bytes::Bytes;

use super::HttpMethod;

/// A pre-registered response for a (method, path) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeResponse {
    /// HTTP status code to report.
    pub status: u16,
    /// Opaque payload; expected to be encoded image bytes.
    pub payload: Option<Bytes>,
}

impl FakeResponse {
    /// Creates a fake response.
    #[must_use]
    pub const fn new(status: u16, payload: Option<Bytes>) -> Self {
        Self { status, payload }
    }
}

/// Registry key for a fake response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FakeRequestKey {
    /// HTTP method.
    pub method: HttpMethod,
    /// Logical image path.
    pub path: String,
}

impl FakeRequestKey {
    /// Key for a GET of `path`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
        }
    }
}
