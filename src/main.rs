use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gyazo_bot::application::{BotContext, CommandRouter, ImageCache, ImageCacheConfig};
use gyazo_bot::infrastructure::{
    AppConfig, CliArgs, DiscordRestClient, GatewayClient, GatewayClientConfig, GyazoClient,
    HttpDownloader, StorageManager, SystemClock, TomlCredentialStore,
};
use gyazo_bot::presentation::Bot;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn create_bot(config: &AppConfig, token: &str) -> Result<Bot> {
    let data_dir = config
        .effective_data_dir()
        .ok_or_else(|| eyre!("failed to determine data directory"))?;
    let credentials = Arc::new(TomlCredentialStore::open(&data_dir)?);
    info!(path = %credentials.path().display(), users = credentials.len(), "Credential store opened");

    let timeout = Duration::from_secs(config.gyazo.timeout_secs);
    let host = Arc::new(GyazoClient::new(
        config.gyazo.api_base_url.clone(),
        config.gyazo.upload_url.clone(),
        timeout,
    )?);
    let downloader = Arc::new(HttpDownloader::new(timeout)?);
    let cache = Arc::new(ImageCache::new(
        host.clone(),
        Arc::new(SystemClock),
        ImageCacheConfig::new(
            config.cache.expiry_secs,
            config.gyazo.page_size,
            config.cache.max_tokens,
        ),
    ));
    let context = BotContext::new(credentials, host, downloader, cache)
        .with_max_images(config.commands.max_images);

    let rest = Arc::new(DiscordRestClient::new(token, timeout)?);
    let router = CommandRouter::new(&context, rest.clone());

    let gateway = GatewayClient::new(
        GatewayClientConfig::new()
            .with_auto_reconnect(config.gateway.auto_reconnect)
            .with_max_reconnect_attempts(config.gateway.max_reconnect_attempts),
    );

    Ok(Bot::new(gateway, rest, router))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = dotenvy::dotenv();

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = gyazo_bot::VERSION, "Starting {}", gyazo_bot::NAME);

    let bot = create_bot(&config, &args.token)?;
    bot.run(&args.token).await?;

    info!("Bot stopped");
    Ok(())
}
