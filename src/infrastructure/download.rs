//! HTTP image downloader.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use tracing::debug;

use crate::domain::entities::{ImageFile, file_name_from_url};
use crate::domain::errors::DownloadError;
use crate::domain::ports::DownloaderPort;

/// Fetches images over plain HTTP GET.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Creates downloader with a request timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("gyazo-bot/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DownloaderPort for HttpDownloader {
    async fn download(&self, url: &str) -> Result<ImageFile, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let data = response.bytes().await.map_err(|e| DownloadError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!(url, size = data.len(), "Downloaded image");
        let file = ImageFile::new(file_name_from_url(url), data);
        Ok(match content_type {
            Some(content_type) => file.with_content_type(content_type),
            None => file,
        })
    }
}
