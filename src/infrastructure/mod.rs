//! Infrastructure layer with external service adapters.

/// Wall clock.
pub mod clock;
/// Application configuration.
pub mod config;
/// Discord gateway and REST adapters.
pub mod discord;
/// HTTP image downloads.
pub mod download;
/// Gyazo API client.
pub mod gyazo;
/// Credential storage adapters.
pub mod storage;

pub use clock::SystemClock;
pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use discord::{DiscordRestClient, GatewayClient, GatewayClientConfig};
pub use download::HttpDownloader;
pub use gyazo::GyazoClient;
pub use storage::TomlCredentialStore;
