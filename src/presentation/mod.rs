//! Presentation layer: the long-running bot process.

/// Gateway event loop.
pub mod bot;

pub use bot::{Bot, BotError};
