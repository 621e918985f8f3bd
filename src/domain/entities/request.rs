//! Request identity and request description types.

use super::AuthToken;

/// Kind of network operation a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Binary download to a local buffer.
    Download,
}

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
        }
    }
}

/// Identity used to correlate a cancellation with a running download.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InFlightRequestIdentity {
    /// Operation kind.
    pub kind: OperationKind,
    /// HTTP method.
    pub method: HttpMethod,
    /// Fully resolved request URL.
    pub url: String,
}

impl InFlightRequestIdentity {
    /// Identity of an image download for the given URL.
    #[must_use]
    pub fn download(url: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Download,
            method: HttpMethod::Get,
            url: url.into(),
        }
    }
}

impl std::fmt::Display for InFlightRequestIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} {} {}", self.kind, self.method, self.url)
    }
}

/// `Accept` header value sent with every image download.
pub const DOWNLOAD_ACCEPT: &str = "application/json";

/// Description of a download handed to the transport.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Fully resolved request URL.
    pub url: String,
    /// Bearer token attached as `Authorization`, if configured.
    pub bearer_token: Option<AuthToken>,
    /// Value of the `Accept` header.
    pub accept: &'static str,
}

impl DownloadRequest {
    /// Builds a GET download request.
    #[must_use]
    pub fn get(url: impl Into<String>, bearer_token: Option<AuthToken>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            bearer_token,
            accept: DOWNLOAD_ACCEPT,
        }
    }

    /// Returns the in-flight identity of this request.
    #[must_use]
    pub fn identity(&self) -> InFlightRequestIdentity {
        InFlightRequestIdentity {
            kind: OperationKind::Download,
            method: self.method,
            url: self.url.clone(),
        }
    }

    /// Returns the `Authorization` header value, if any.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.bearer_token
            .as_ref()
            .map(|token| format!("Bearer {}", token.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_matches_request() {
        let request = DownloadRequest::get("https://example.com/avatar", None);
        assert_eq!(
            request.identity(),
            InFlightRequestIdentity::download("https://example.com/avatar")
        );
    }

    #[test]
    fn test_authorization_header() {
        let request = DownloadRequest::get(
            "https://example.com/avatar",
            Some(AuthToken::new_unchecked("abc123")),
        );
        assert_eq!(request.authorization().as_deref(), Some("Bearer abc123"));
        assert_eq!(request.accept, "application/json");

        let anonymous = DownloadRequest::get("https://example.com/avatar", None);
        assert!(anonymous.authorization().is_none());
    }
}
