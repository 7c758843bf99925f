//! Application layer with command handlers and the image cache.

/// Handler dependencies.
pub mod context;
/// Reply texts.
pub mod messages;
/// Application services.
pub mod services;
/// Command handlers.
pub mod use_cases;

pub use context::BotContext;
pub use services::{ImageCache, ImageCacheConfig};
pub use use_cases::CommandRouter;
