//! Recent images use case implementation.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use super::stored_token;
use crate::application::BotContext;
use crate::application::messages;
use crate::application::services::ImageCache;
use crate::domain::entities::{AccessToken, ImageFile, Reply, UserId};
use crate::domain::ports::{CredentialStorePort, DownloaderPort};

/// Validated `lastimages` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastImagesJob {
    /// Token of the invoking user.
    pub token: AccessToken,
    /// Number of images to send, already clamped.
    pub count: usize,
}

/// Sends a user's most recent images as attachments.
#[derive(Clone)]
pub struct LastImagesUseCase {
    credentials: Arc<dyn CredentialStorePort>,
    cache: Arc<ImageCache>,
    downloader: Arc<dyn DownloaderPort>,
    max_images: usize,
}

impl LastImagesUseCase {
    /// Creates use case from the shared context.
    #[must_use]
    pub fn new(context: &BotContext) -> Self {
        Self {
            credentials: Arc::clone(&context.credentials),
            cache: Arc::clone(&context.cache),
            downloader: Arc::clone(&context.downloader),
            max_images: context.max_images,
        }
    }

    /// Checks authorization and count.
    ///
    /// A missing count means one image; larger counts are clamped to the
    /// configured maximum.
    ///
    /// # Errors
    /// Returns the immediate reply when the request cannot proceed.
    pub fn prepare(&self, user_id: &UserId, count: Option<i64>) -> Result<LastImagesJob, Reply> {
        let token = stored_token(self.credentials.as_ref(), user_id)?;
        let requested = count.unwrap_or(1);
        if requested < 1 {
            return Err(Reply::public(messages::INVALID_COUNT));
        }
        let count = usize::try_from(requested)
            .unwrap_or(usize::MAX)
            .min(self.max_images);
        Ok(LastImagesJob { token, count })
    }

    /// Downloads the first `count` images and builds the reply.
    pub async fn execute(&self, job: LastImagesJob) -> Reply {
        let images = self.cache.fetch_all(&job.token).await;
        if images.is_empty() {
            return Reply::public(messages::NO_IMAGES);
        }

        let urls: Vec<&str> = images
            .iter()
            .take(job.count)
            .filter_map(|image| image.source_url())
            .collect();
        debug!(requested = job.count, downloads = urls.len(), "Downloading recent images");

        let results = join_all(urls.iter().map(|url| self.downloader.download(url))).await;
        let files: Vec<ImageFile> = results
            .into_iter()
            .filter_map(|result| match result {
                Ok(file) => Some(file),
                Err(e) => {
                    warn!(url = %e.url(), error = %e, "Skipping image");
                    None
                }
            })
            .collect();

        if files.is_empty() {
            return Reply::public(messages::NO_VALID_IMAGES);
        }

        info!(count = files.len(), "Sending recent images");
        Reply::public(messages::last_images(files.len())).with_files(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::ImageCacheConfig;
    use crate::domain::entities::Image;
    use crate::domain::ports::mocks::{
        ManualClock, MockCredentialStore, MockDownloader, MockImageHostPort,
    };

    fn listing(count: usize) -> Vec<Image> {
        (0..count)
            .map(|i| {
                let url = format!("https://i.gyazo.com/{i}.png");
                Image::new(Some(&url), None)
            })
            .collect()
    }

    fn context(images: Vec<Image>, downloader: MockDownloader) -> (BotContext, Arc<MockDownloader>) {
        let mut host = MockImageHostPort::new();
        host.expect_list_images().returning(move |_, page, _| {
            Ok(if page == 1 { images.clone() } else { Vec::new() })
        });
        let host: Arc<MockImageHostPort> = Arc::new(host);
        let downloader = Arc::new(downloader);
        let cache = Arc::new(ImageCache::new(
            host.clone(),
            Arc::new(ManualClock::at_epoch()),
            ImageCacheConfig::default(),
        ));
        let context = BotContext::new(
            Arc::new(MockCredentialStore::with_token("1", "tok")),
            host,
            downloader.clone(),
            cache,
        );
        (context, downloader)
    }

    fn downloader_for(count: usize) -> MockDownloader {
        (0..count).fold(MockDownloader::new(), |d, i| {
            d.with_body(&format!("https://i.gyazo.com/{i}.png"), b"png")
        })
    }

    #[test]
    fn test_unauthorized_user() {
        let (ctx, _) = context(Vec::new(), MockDownloader::new());
        let uc = LastImagesUseCase::new(&ctx);

        let reply = uc.prepare(&UserId::from("2"), Some(3)).unwrap_err();
        assert_eq!(reply, Reply::ephemeral(messages::NOT_AUTHORIZED));
    }

    #[test]
    fn test_count_validation_and_clamping() {
        let (ctx, _) = context(Vec::new(), MockDownloader::new());
        let uc = LastImagesUseCase::new(&ctx);
        let user = UserId::from("1");

        let zero = uc.prepare(&user, Some(0)).unwrap_err();
        assert_eq!(zero.content, messages::INVALID_COUNT);
        assert!(uc.prepare(&user, Some(-5)).is_err());
        assert_eq!(uc.prepare(&user, None).unwrap().count, 1);
        assert_eq!(uc.prepare(&user, Some(999)).unwrap().count, 10);
    }

    #[tokio::test]
    async fn test_clamped_count_downloads_exactly_max() {
        let (ctx, downloader) = context(listing(50), downloader_for(50));
        let uc = LastImagesUseCase::new(&ctx);

        let job = uc.prepare(&UserId::from("1"), Some(999)).unwrap();
        let reply = uc.execute(job).await;

        assert_eq!(downloader.requested().len(), 10);
        assert_eq!(reply.files.len(), 10);
        assert_eq!(reply.content, "Here are your 10 images:");
        assert_eq!(reply.files[0].filename, "0.png");
    }

    #[tokio::test]
    async fn test_failed_downloads_are_skipped() {
        let downloader = MockDownloader::new().with_body("https://i.gyazo.com/1.png", b"png");
        let (ctx, _) = context(listing(3), downloader);
        let uc = LastImagesUseCase::new(&ctx);

        let job = uc.prepare(&UserId::from("1"), Some(3)).unwrap();
        let reply = uc.execute(job).await;

        assert_eq!(reply.content, "Here are your 1 images:");
        assert_eq!(reply.files.len(), 1);
    }

    #[tokio::test]
    async fn test_all_downloads_failing() {
        let (ctx, _) = context(listing(2), MockDownloader::new());
        let uc = LastImagesUseCase::new(&ctx);

        let job = uc.prepare(&UserId::from("1"), Some(2)).unwrap();
        assert_eq!(uc.execute(job).await.content, messages::NO_VALID_IMAGES);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let (ctx, downloader) = context(Vec::new(), MockDownloader::new());
        let uc = LastImagesUseCase::new(&ctx);

        let job = uc.prepare(&UserId::from("1"), None).unwrap();
        assert_eq!(uc.execute(job).await.content, messages::NO_IMAGES);
        assert!(downloader.requested().is_empty());
    }

    #[tokio::test]
    async fn test_thumbnail_used_when_url_missing() {
        let images = vec![Image::new(None, Some("https://thumb.gyazo.com/t.jpg"))];
        let downloader = MockDownloader::new().with_body("https://thumb.gyazo.com/t.jpg", b"jpg");
        let (ctx, _) = context(images, downloader);
        let uc = LastImagesUseCase::new(&ctx);

        let job = uc.prepare(&UserId::from("1"), None).unwrap();
        let reply = uc.execute(job).await;

        assert_eq!(reply.files[0].filename, "t.jpg");
    }
}
