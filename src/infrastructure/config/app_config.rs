//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::CliArgs;
use crate::application::context::DEFAULT_MAX_IMAGES;
use crate::application::services::{DEFAULT_EXPIRY_SECS, DEFAULT_MAX_TOKENS, DEFAULT_PAGE_SIZE};

pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "gyazo-bot";
pub(crate) const APP_NAME: &str = "gyazo-bot";

/// Default Gyazo API base.
pub const DEFAULT_GYAZO_API_BASE: &str = "https://api.gyazo.com";
/// Default Gyazo upload endpoint.
pub const DEFAULT_GYAZO_UPLOAD_URL: &str = "https://upload.gyazo.com/api/upload";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Bot configuration file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stdout when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Directory holding the credential file.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Gyazo API settings.
    #[serde(default)]
    pub gyazo: GyazoConfig,

    /// Image listing cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Command limits.
    #[serde(default)]
    pub commands: CommandsConfig,

    /// Gateway connection settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Gyazo API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GyazoConfig {
    /// Base URL for the listing API.
    #[serde(default = "default_api_base")]
    pub api_base_url: String,

    /// Upload endpoint.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Images requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GyazoConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base(),
            upload_url: default_upload_url(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a listing stays fresh.
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u64,

    /// Tokens with a cached listing.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiry_secs: DEFAULT_EXPIRY_SECS,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Command configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Largest `lastimages` count.
    #[serde(default = "default_max_images")]
    pub max_images: usize,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            max_images: DEFAULT_MAX_IMAGES,
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Reconnect after recoverable disconnects.
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,

    /// Consecutive reconnect attempts before giving up.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            max_reconnect_attempts: default_max_reconnect_attempts(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_GYAZO_API_BASE.to_string()
}

fn default_upload_url() -> String {
    DEFAULT_GYAZO_UPLOAD_URL.to_string()
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_expiry_secs() -> u64 {
    DEFAULT_EXPIRY_SECS
}

const fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

const fn default_max_images() -> usize {
    DEFAULT_MAX_IMAGES
}

const fn default_true() -> bool {
    true
}

const fn default_max_reconnect_attempts() -> u32 {
    10
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(data_dir) = &args.data_dir {
            self.data_dir = Some(data_dir.clone());
        }
    }

    /// Returns default data directory.
    #[must_use]
    pub fn default_data_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Returns effective data directory.
    #[must_use]
    pub fn effective_data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(Self::default_data_dir)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            data_dir: None,
            gyazo: GyazoConfig::default(),
            cache: CacheConfig::default(),
            commands: CommandsConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}
