//! Application configuration.

/// Configuration file schema and defaults.
pub mod app_config;
/// Command line arguments.
pub mod args;
/// Configuration file loading and paths.
pub mod storage;

pub use app_config::{
    AppConfig, CacheConfig, CommandsConfig, GatewayConfig, GyazoConfig, LogLevel,
};
pub use args::CliArgs;
pub use storage::{ConfigError, StorageManager};
