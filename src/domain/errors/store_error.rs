//! Credential storage error types.

use std::path::PathBuf;

use thiserror::Error;

/// Credential store error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum StoreError {
    #[error("failed to determine data directory")]
    DataDirNotFound,

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential file {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize credentials: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl StoreError {
    /// Creates io error tied to a path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
