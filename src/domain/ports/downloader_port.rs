//! URL download port definition.

use async_trait::async_trait;

use crate::domain::entities::ImageFile;
use crate::domain::errors::DownloadError;

/// Port for fetching image bytes by URL.
#[async_trait]
pub trait DownloaderPort: Send + Sync {
    /// Downloads the resource at `url`.
    ///
    /// Any non-success status is an error.
    async fn download(&self, url: &str) -> Result<ImageFile, DownloadError>;
}
