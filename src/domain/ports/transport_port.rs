//! Download transport port definition.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::entities::DownloadRequest;

/// Response received from the transport, whatever its status.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Full response body.
    pub body: Bytes,
}

/// Transport-level failure: no response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request was cancelled before it completed.
    #[error("request cancelled")]
    Cancelled,
    /// Connection, timeout or body read failure.
    #[error("{0}")]
    Failed(String),
}

/// Port for issuing binary downloads.
///
/// Dropping the returned future must abort the underlying request.
#[async_trait]
pub trait DownloadTransport: Send + Sync {
    /// Performs the request and buffers the whole body.
    async fn download(&self, request: &DownloadRequest)
    -> Result<TransportResponse, TransportError>;
}
