//! Dependencies shared by every command handler.

use std::sync::Arc;

use crate::application::services::ImageCache;
use crate::domain::ports::{CredentialStorePort, DownloaderPort, ImageHostPort};

/// Default upper bound for `lastimages`.
pub const DEFAULT_MAX_IMAGES: usize = 10;

/// Constructed once at startup and handed to the command router.
#[derive(Clone)]
pub struct BotContext {
    /// Per-user token storage.
    pub credentials: Arc<dyn CredentialStorePort>,
    /// Image host API.
    pub host: Arc<dyn ImageHostPort>,
    /// Image downloader.
    pub downloader: Arc<dyn DownloaderPort>,
    /// Listing cache over `host`.
    pub cache: Arc<ImageCache>,
    /// Largest accepted `lastimages` count.
    pub max_images: usize,
}

impl BotContext {
    /// Creates context with the default image limit.
    #[must_use]
    pub fn new(
        credentials: Arc<dyn CredentialStorePort>,
        host: Arc<dyn ImageHostPort>,
        downloader: Arc<dyn DownloaderPort>,
        cache: Arc<ImageCache>,
    ) -> Self {
        Self {
            credentials,
            host,
            downloader,
            cache,
            max_images: DEFAULT_MAX_IMAGES,
        }
    }

    /// Overrides the `lastimages` limit. Zero is raised to one.
    #[must_use]
    pub fn with_max_images(mut self, max_images: usize) -> Self {
        self.max_images = max_images.max(1);
        self
    }
}
