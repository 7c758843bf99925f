//! Time-expiring cache of each token's full image listing.

use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::domain::entities::{AccessToken, Image};
use crate::domain::ports::{ClockPort, ImageHostPort};

/// Default seconds a listing stays fresh.
pub const DEFAULT_EXPIRY_SECS: u64 = 60;
/// Default number of images requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Default number of tokens with a cached listing.
pub const DEFAULT_MAX_TOKENS: usize = 64;

/// Cache tuning.
#[derive(Debug, Clone, Copy)]
pub struct ImageCacheConfig {
    /// How long a listing is served without refetching.
    pub expiry: TimeDelta,
    /// Images requested per page.
    pub page_size: u32,
    /// Tokens kept before the least recently used one is evicted.
    pub max_tokens: NonZeroUsize,
}

impl ImageCacheConfig {
    /// Creates config from plain numbers, clamping zeros to one.
    #[must_use]
    pub fn new(expiry_secs: u64, page_size: u32, max_tokens: usize) -> Self {
        let expiry = i64::try_from(expiry_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        Self {
            expiry,
            page_size: page_size.max(1),
            max_tokens: NonZeroUsize::new(max_tokens).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl Default for ImageCacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_EXPIRY_SECS, DEFAULT_PAGE_SIZE, DEFAULT_MAX_TOKENS)
    }
}

struct CacheSlot {
    images: Arc<Vec<Image>>,
    last_updated: DateTime<Utc>,
}

/// Fetch-with-cache over the host's paginated image listing.
///
/// Each token owns a slot holding its accumulated listing and the time it was
/// fetched. A slot younger than the expiry window is returned as is; anything
/// older triggers a full paginated refetch. The lock is only held for slot
/// lookups and replacement, so concurrent callers may both refetch.
pub struct ImageCache {
    host: Arc<dyn ImageHostPort>,
    clock: Arc<dyn ClockPort>,
    config: ImageCacheConfig,
    slots: Mutex<LruCache<String, CacheSlot>>,
}

impl ImageCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(
        host: Arc<dyn ImageHostPort>,
        clock: Arc<dyn ClockPort>,
        config: ImageCacheConfig,
    ) -> Self {
        Self {
            host,
            clock,
            config,
            slots: Mutex::new(LruCache::new(config.max_tokens)),
        }
    }

    /// Returns every image of the token owner, newest first.
    ///
    /// Never fails: listing errors end pagination and an outage yields an
    /// empty listing that is cached for one expiry window.
    pub async fn fetch_all(&self, token: &AccessToken) -> Arc<Vec<Image>> {
        let key = token.fingerprint();
        let now = self.clock.now();

        if let Some(images) = self.fresh(&key, now) {
            debug!(token = %token, count = images.len(), "Serving cached image listing");
            return images;
        }

        let images = Arc::new(self.fetch_pages(token).await);
        let fetched_at = self.clock.now();
        info!(token = %token, count = images.len(), "Refreshed image listing");

        self.slots.lock().put(
            key,
            CacheSlot {
                images: Arc::clone(&images),
                last_updated: fetched_at,
            },
        );
        images
    }

    /// Returns the number of tokens with a cached listing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Returns whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    fn fresh(&self, key: &str, now: DateTime<Utc>) -> Option<Arc<Vec<Image>>> {
        let mut slots = self.slots.lock();
        let slot = slots.get(key)?;
        (now - slot.last_updated < self.config.expiry).then(|| Arc::clone(&slot.images))
    }

    async fn fetch_pages(&self, token: &AccessToken) -> Vec<Image> {
        let mut images = Vec::new();
        let mut page = 1u32;

        loop {
            match self
                .host
                .list_images(token, page, self.config.page_size)
                .await
            {
                Ok(batch) if batch.is_empty() => break,
                Ok(batch) => {
                    debug!(page, count = batch.len(), "Fetched image page");
                    images.extend(batch);
                }
                Err(e) => {
                    debug!(page, error = %e, "Image listing stopped");
                    break;
                }
            }
            page = match page.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }

        images
    }
}
