//! Application services.

mod image_cache;

pub use image_cache::{
    DEFAULT_EXPIRY_SECS, DEFAULT_MAX_TOKENS, DEFAULT_PAGE_SIZE, ImageCache, ImageCacheConfig,
};
