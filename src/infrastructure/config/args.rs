//! Command line arguments.

use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Command line arguments.
#[derive(Parser)]
#[command(
    name = "gyazo-bot",
    version,
    about = "Discord bot for browsing and uploading Gyazo images",
    long_about = None
)]
pub struct CliArgs {
    /// Discord bot token.
    #[arg(long, env = "TOKEN", hide_env_values = true)]
    pub token: String,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Directory for the credential file.
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}

impl std::fmt::Debug for CliArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliArgs")
            .field("token", &"[REDACTED]")
            .field("config", &self.config)
            .field("log_path", &self.log_path)
            .field("log_level", &self.log_level)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}
