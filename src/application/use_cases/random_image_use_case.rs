//! Random image use case implementation.

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use super::stored_token;
use crate::application::BotContext;
use crate::application::messages;
use crate::application::services::ImageCache;
use crate::domain::entities::{AccessToken, Reply, UserId};
use crate::domain::ports::{CredentialStorePort, DownloaderPort};

/// Picks one element uniformly at random.
pub fn pick_random<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    items.choose(rng)
}

/// Sends one random image from a user's collection.
#[derive(Clone)]
pub struct RandomImageUseCase {
    credentials: Arc<dyn CredentialStorePort>,
    cache: Arc<ImageCache>,
    downloader: Arc<dyn DownloaderPort>,
}

impl RandomImageUseCase {
    /// Creates use case from the shared context.
    #[must_use]
    pub fn new(context: &BotContext) -> Self {
        Self {
            credentials: Arc::clone(&context.credentials),
            cache: Arc::clone(&context.cache),
            downloader: Arc::clone(&context.downloader),
        }
    }

    /// Checks authorization.
    ///
    /// # Errors
    /// Returns the immediate reply for users without a token.
    pub fn prepare(&self, user_id: &UserId) -> Result<AccessToken, Reply> {
        stored_token(self.credentials.as_ref(), user_id)
    }

    /// Picks, downloads and sends one image.
    pub async fn execute(&self, token: AccessToken) -> Reply {
        let images = self.cache.fetch_all(&token).await;
        let url = {
            let mut rng = rand::thread_rng();
            match pick_random(images.as_slice(), &mut rng) {
                None => return Reply::public(messages::NO_IMAGES),
                Some(image) => image.source_url().map(str::to_owned),
            }
        };
        let Some(url) = url else {
            return Reply::public(messages::NO_VALID_URL);
        };

        match self.downloader.download(&url).await {
            Ok(file) => {
                info!(url = %url, "Sending random image");
                Reply::public(messages::RANDOM_IMAGE).with_files(vec![file])
            }
            Err(e) => {
                warn!(error = %e, "Random image download failed");
                Reply::public(messages::RANDOM_DOWNLOAD_FAILED)
            }
        }
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
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn context(images: Vec<Image>, downloader: MockDownloader) -> BotContext {
        let mut host = MockImageHostPort::new();
        host.expect_list_images().returning(move |_, page, _| {
            Ok(if page == 1 { images.clone() } else { Vec::new() })
        });
        let host: Arc<MockImageHostPort> = Arc::new(host);
        let cache = Arc::new(ImageCache::new(
            host.clone(),
            Arc::new(ManualClock::at_epoch()),
            ImageCacheConfig::default(),
        ));
        BotContext::new(
            Arc::new(MockCredentialStore::with_token("1", "tok")),
            host,
            Arc::new(downloader),
            cache,
        )
    }

    #[test]
    fn test_pick_random_is_uniform() {
        const N: usize = 8;
        const TRIALS: usize = 10_000;
        let items: Vec<usize> = (0..N).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = [0usize; N];

        for _ in 0..TRIALS {
            let picked = pick_random(items.as_slice(), &mut rng).unwrap();
            counts[*picked] += 1;
        }

        let expected = TRIALS / N;
        for count in counts {
            assert!(
                count.abs_diff(expected) * 10 <= expected,
                "count {count} outside 10% of {expected}"
            );
        }
    }

    #[test]
    fn test_pick_random_empty() {
        let items: [u8; 0] = [];
        assert!(pick_random(&items[..], &mut StdRng::seed_from_u64(1)).is_none());
    }

    #[test]
    fn test_unauthorized_user() {
        let uc = RandomImageUseCase::new(&context(Vec::new(), MockDownloader::new()));
        assert_eq!(
            uc.prepare(&UserId::from("9")).unwrap_err().content,
            messages::NOT_AUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_sends_single_image() {
        let images = vec![Image::new(Some("https://i.gyazo.com/only.png"), None)];
        let downloader = MockDownloader::new().with_body("https://i.gyazo.com/only.png", b"png");
        let uc = RandomImageUseCase::new(&context(images, downloader));

        let token = uc.prepare(&UserId::from("1")).unwrap();
        let reply = uc.execute(token).await;

        assert_eq!(reply.content, messages::RANDOM_IMAGE);
        assert_eq!(reply.files.len(), 1);
        assert_eq!(reply.files[0].filename, "only.png");
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let uc = RandomImageUseCase::new(&context(Vec::new(), MockDownloader::new()));
        let reply = uc.execute(AccessToken::new_unchecked("tok")).await;
        assert_eq!(reply.content, messages::NO_IMAGES);
    }

    #[tokio::test]
    async fn test_image_without_url() {
        let images = vec![Image::new(Some(""), None)];
        let uc = RandomImageUseCase::new(&context(images, MockDownloader::new()));
        let reply = uc.execute(AccessToken::new_unchecked("tok")).await;
        assert_eq!(reply.content, messages::NO_VALID_URL);
    }

    #[tokio::test]
    async fn test_download_failure() {
        let images = vec![Image::new(Some("https://i.gyazo.com/gone.png"), None)];
        let uc = RandomImageUseCase::new(&context(images, MockDownloader::new()));
        let reply = uc.execute(AccessToken::new_unchecked("tok")).await;
        assert_eq!(reply.content, messages::RANDOM_DOWNLOAD_FAILED);
    }
}
