//! Image host API error types.

use thiserror::Error;

/// Errors returned by the image host adapter.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ApiError {
    #[error("token rejected by Gyazo: {message}")]
    Rejected { status: u16, message: String },

    #[error("rate limited by Gyazo")]
    RateLimited,

    #[error("network error talking to Gyazo: {message}")]
    Network { message: String },

    #[error("unexpected Gyazo response: {message}")]
    InvalidResponse { message: String },

    #[error("unexpected Gyazo error: {message}")]
    Unexpected { message: String },
}

impl ApiError {
    /// Creates rejected error.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns whether the token itself was refused.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Rejected { status: 401 | 403, .. })
    }

    /// Returns whether error is network related.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::RateLimited)
    }
}

/// Errors downloading an image by URL.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DownloadError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl DownloadError {
    /// Returns the URL that failed.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. } | Self::Status { url, .. } | Self::Body { url, .. } => url,
        }
    }
}
