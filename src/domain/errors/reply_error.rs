//! Errors answering an interaction.

use thiserror::Error;

/// Reply delivery error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ReplyError {
    #[error("Discord rejected the reply with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("network error sending reply: {message}")]
    Network { message: String },

    #[error("failed to encode reply: {message}")]
    Encoding { message: String },
}

impl ReplyError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates encoding error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Returns whether the interaction token is no longer usable.
    #[must_use]
    pub const fn is_expired_interaction(&self) -> bool {
        matches!(self, Self::Rejected { status: 404, .. })
    }
}
