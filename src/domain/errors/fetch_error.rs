//! Image fetch error types.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Status code reported for a cancelled download.
pub const CANCELLED_CODE: i32 = -999;

/// Status code reported when no usable response was received.
pub const TRANSPORT_FAILURE_CODE: i32 = 500;

/// Status code reported for contract violations.
pub const CONTRACT_VIOLATION_CODE: i32 = -1;

/// Image fetch error variants.
///
/// Every variant maps to the integer status code delivered with a failed
/// outcome. `InvalidCacheName` and `CorruptCache` are contract violations:
/// they point at a misconfigured client or a damaged cache directory rather
/// than at a bad network response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("{reason}")]
    Fake { status: u16, reason: String },

    #[error("fake response with status {status} carries no decodable image")]
    FakeUndecodable { status: u16 },

    #[error("{reason}")]
    Http { status: u16, reason: String },

    #[error("Failed to load url: {url}")]
    Transport { url: String, message: String },

    #[error("Failed to load url: {url} (undecodable image data)")]
    Undecodable { url: String },

    #[error("cancelled")]
    Cancelled,

    #[error("invalid cache name: {name:?}")]
    InvalidCacheName { name: String },

    #[error("corrupt cache file {}: {message}", path.display())]
    CorruptCache { path: PathBuf, message: String },
}

impl FetchError {
    /// Creates a failure for a non-success fake response.
    #[must_use]
    pub fn fake(status: u16) -> Self {
        Self::Fake {
            status,
            reason: reason_phrase(status),
        }
    }

    /// Creates a failure for a non-success HTTP response.
    #[must_use]
    pub fn http(status: u16) -> Self {
        Self::Http {
            status,
            reason: reason_phrase(status),
        }
    }

    /// Creates a transport-level failure.
    #[must_use]
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a corrupt cache error.
    #[must_use]
    pub fn corrupt_cache(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CorruptCache {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the status code reported with this failure.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Fake { status, .. }
            | Self::FakeUndecodable { status }
            | Self::Http { status, .. } => i32::from(*status),
            Self::Transport { .. } | Self::Undecodable { .. } => TRANSPORT_FAILURE_CODE,
            Self::Cancelled => CANCELLED_CODE,
            Self::InvalidCacheName { .. } | Self::CorruptCache { .. } => CONTRACT_VIOLATION_CODE,
        }
    }

    /// Returns the message reported with this failure.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns whether error is a contract violation.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidCacheName { .. } | Self::CorruptCache { .. }
        )
    }

    /// Returns whether error is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !self.is_contract_violation()
    }
}

/// Returns the canonical reason phrase for an HTTP status code.
#[must_use]
pub fn reason_phrase(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown")
        .to_string()
}

/// Returns true if the status code is in the 2xx class.
#[must_use]
pub fn is_success_status(status: u16) -> bool {
    StatusCode::from_u16(status).is_ok_and(|code| code.is_success())
}
