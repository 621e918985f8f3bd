//! HTTP download transport backed by `reqwest`.

use async_trait::async_trait;
use reqwest::{Client, header};
use tracing::{debug, warn};

use crate::domain::entities::{DownloadRequest, HttpMethod};
use crate::domain::ports::{DownloadTransport, TransportError, TransportResponse};

const USER_AGENT: &str = concat!("netimage/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Image download transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a transport with a custom timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                TransportError::Failed(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DownloadTransport for ReqwestTransport {
    async fn download(
        &self,
        request: &DownloadRequest,
    ) -> Result<TransportResponse, TransportError> {
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
        };

        let mut builder = builder.header(header::ACCEPT, request.accept);
        if let Some(authorization) = request.authorization() {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }

        debug!(url = %request.url, "Issuing image download");

        let response = builder.send().await.map_err(|e| {
            warn!(url = %request.url, error = %e, "Image download failed");
            if e.is_timeout() {
                TransportError::Failed("request timed out".to_string())
            } else if e.is_connect() {
                TransportError::Failed(format!("failed to connect: {e}"))
            } else {
                TransportError::Failed(e.to_string())
            }
        })?;

        let status = response.status().as_u16();

        let body = response.bytes().await.map_err(|e| {
            warn!(url = %request.url, status, error = %e, "Failed to read response body");
            TransportError::Failed(format!("Failed to read body: {e}"))
        })?;

        debug!(url = %request.url, status, size = body.len(), "Image download finished");

        Ok(TransportResponse { status, body })
    }
}
