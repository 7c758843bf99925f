//! Dispatches parsed interactions to their handlers.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{
    AuthorizeUseCase, DeauthorizeUseCase, LastImagesUseCase, RandomImageUseCase,
    UploadImageUseCase,
};
use crate::application::BotContext;
use crate::application::messages;
use crate::domain::entities::{Command, Interaction, InteractionHandle, Reply};
use crate::domain::errors::ReplyError;
use crate::domain::ports::ResponderPort;

/// Routes each command to its use case and delivers the reply.
///
/// Checks that need no network answer immediately. Everything else is
/// deferred first, then answered with a follow-up once the work is done.
#[derive(Clone)]
pub struct CommandRouter {
    authorize: AuthorizeUseCase,
    deauthorize: DeauthorizeUseCase,
    last_images: LastImagesUseCase,
    random_image: RandomImageUseCase,
    upload: UploadImageUseCase,
    responder: Arc<dyn ResponderPort>,
}

impl CommandRouter {
    /// Creates router over the shared context.
    #[must_use]
    pub fn new(context: &BotContext, responder: Arc<dyn ResponderPort>) -> Self {
        Self {
            authorize: AuthorizeUseCase::new(
                Arc::clone(&context.host),
                Arc::clone(&context.credentials),
            ),
            deauthorize: DeauthorizeUseCase::new(Arc::clone(&context.credentials)),
            last_images: LastImagesUseCase::new(context),
            random_image: RandomImageUseCase::new(context),
            upload: UploadImageUseCase::new(context),
            responder,
        }
    }

    /// Handles one interaction to completion.
    ///
    /// Reply delivery failures are logged; nothing is propagated.
    pub async fn handle(&self, interaction: Interaction) {
        let Interaction {
            handle,
            user_id,
            command,
        } = interaction;
        info!(command = command.name(), user_id = %user_id, "Handling command");

        match command {
            Command::Authorize { token } => match self.authorize.prepare(token.as_deref()) {
                Ok(token) => {
                    self.deferred(&handle, true, self.authorize.execute(&user_id, token))
                        .await;
                }
                Err(reply) => self.respond(&handle, reply).await,
            },
            Command::Deauthorize => {
                let reply = self.deauthorize.execute(&user_id);
                self.respond(&handle, reply).await;
            }
            Command::LastImages { count } => match self.last_images.prepare(&user_id, count) {
                Ok(job) => {
                    self.deferred(&handle, false, self.last_images.execute(job))
                        .await;
                }
                Err(reply) => self.respond(&handle, reply).await,
            },
            Command::RandomImage => match self.random_image.prepare(&user_id) {
                Ok(token) => {
                    self.deferred(&handle, false, self.random_image.execute(token))
                        .await;
                }
                Err(reply) => self.respond(&handle, reply).await,
            },
            Command::Upload { url, attachment } => {
                match self.upload.prepare(&user_id, url, attachment) {
                    Ok(job) => self.deferred(&handle, false, self.upload.execute(job)).await,
                    Err(reply) => self.respond(&handle, reply).await,
                }
            }
            Command::Unknown { name } => {
                debug!(command = %name, "Ignoring unknown command");
                self.respond(&handle, Reply::ephemeral(messages::UNKNOWN_COMMAND))
                    .await;
            }
        }
    }

    async fn respond(&self, handle: &InteractionHandle, reply: Reply) {
        if let Err(e) = self.responder.respond(handle, reply).await {
            warn!(interaction_id = %handle.id, error = %e, "Failed to send response");
        }
    }

    async fn deferred<F>(&self, handle: &InteractionHandle, ephemeral: bool, work: F)
    where
        F: Future<Output = Reply>,
    {
        if let Err(e) = self.responder.defer(handle, ephemeral).await {
            warn!(interaction_id = %handle.id, error = %e, "Failed to defer response");
            return;
        }

        let reply = work.await;
        let Err(e) = self.responder.follow_up(handle, reply).await else {
            return;
        };
        warn!(
            interaction_id = %handle.id,
            expired = e.is_expired_interaction(),
            error = %e,
            "Failed to send follow-up"
        );
        let rejected = matches!(e, ReplyError::Rejected { status: 400..=499, .. });
        if !rejected || e.is_expired_interaction() {
            return;
        }

        // Replace the pending state with a plain notice.
        let notice = Reply {
            content: messages::REPLY_FAILED.to_string(),
            files: Vec::new(),
            ephemeral,
        };
        if let Err(e) = self.responder.follow_up(handle, notice).await {
            warn!(interaction_id = %handle.id, error = %e, "Failed to send fallback follow-up");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{ImageCache, ImageCacheConfig};
    use crate::domain::entities::{Image, UserId};
    use crate::domain::ports::CredentialStorePort;
    use crate::domain::ports::mocks::{
        ManualClock, MockCredentialStore, MockDownloader, MockImageHostPort, RecordingResponder,
        Sent,
    };

    struct Harness {
        router: CommandRouter,
        responder: Arc<RecordingResponder>,
        store: Arc<MockCredentialStore>,
    }

    fn harness(host: MockImageHostPort, downloader: MockDownloader) -> Harness {
        let host: Arc<MockImageHostPort> = Arc::new(host);
        let store = Arc::new(MockCredentialStore::with_token("1", "tok"));
        let responder = Arc::new(RecordingResponder::new());
        let cache = Arc::new(ImageCache::new(
            host.clone(),
            Arc::new(ManualClock::at_epoch()),
            ImageCacheConfig::default(),
        ));
        let context = BotContext::new(store.clone(), host, Arc::new(downloader), cache);
        Harness {
            router: CommandRouter::new(&context, responder.clone()),
            responder,
            store,
        }
    }

    fn interaction(user: &str, command: Command) -> Interaction {
        Interaction {
            handle: InteractionHandle::new("100", "200", "secret"),
            user_id: UserId::from(user),
            command,
        }
    }

    #[tokio::test]
    async fn test_instructions_answered_immediately() {
        let h = harness(MockImageHostPort::new(), MockDownloader::new());

        h.router
            .handle(interaction("1", Command::Authorize { token: None }))
            .await;

        let sent = h.responder.sent();
        assert_eq!(sent.len(), 1);
        assert!(matches!(&sent[0], Sent::Respond(reply) if reply.ephemeral));
    }

    #[tokio::test]
    async fn test_authorize_is_deferred_ephemerally() {
        let mut host = MockImageHostPort::new();
        host.expect_validate_token().returning(|_| Ok(()));
        let h = harness(host, MockDownloader::new());

        h.router
            .handle(interaction(
                "9",
                Command::Authorize {
                    token: Some("fresh".into()),
                },
            ))
            .await;

        assert_eq!(
            h.responder.sent(),
            vec![
                Sent::Defer { ephemeral: true },
                Sent::FollowUp(Reply::ephemeral(messages::AUTHORIZE_SUCCESS)),
            ]
        );
        assert_eq!(
            h.store.get(&UserId::from("9")).unwrap().as_str(),
            "fresh"
        );
    }

    #[tokio::test]
    async fn test_unauthorized_lastimages_skips_network() {
        let mut host = MockImageHostPort::new();
        host.expect_list_images().never();
        let h = harness(host, MockDownloader::new());

        h.router
            .handle(interaction("2", Command::LastImages { count: Some(3) }))
            .await;

        assert_eq!(
            h.responder.sent(),
            vec![Sent::Respond(Reply::ephemeral(messages::NOT_AUTHORIZED))]
        );
    }

    fn random_image_harness() -> Harness {
        let mut host = MockImageHostPort::new();
        host.expect_list_images().returning(|_, page, _| {
            Ok(if page == 1 {
                vec![Image::new(Some("https://i.gyazo.com/a.png"), None)]
            } else {
                Vec::new()
            })
        });
        let downloader = MockDownloader::new().with_body("https://i.gyazo.com/a.png", b"png");
        harness(host, downloader)
    }

    #[tokio::test]
    async fn test_randomimage_defers_then_follows_up() {
        let h = random_image_harness();

        h.router
            .handle(interaction("1", Command::RandomImage))
            .await;

        let sent = h.responder.sent();
        assert_eq!(sent[0], Sent::Defer { ephemeral: false });
        match &sent[1] {
            Sent::FollowUp(reply) => {
                assert_eq!(reply.content, messages::RANDOM_IMAGE);
                assert_eq!(reply.files.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_follow_up_is_replaced_by_notice() {
        let h = random_image_harness();
        h.responder.fail_next_follow_up(ReplyError::Rejected {
            status: 413,
            message: "Request entity too large".into(),
        });

        h.router
            .handle(interaction("1", Command::RandomImage))
            .await;

        let sent = h.responder.sent();
        assert_eq!(sent.len(), 3);
        assert!(matches!(&sent[1], Sent::FollowUp(reply) if reply.files.len() == 1));
        assert_eq!(sent[2], Sent::FollowUp(Reply::public(messages::REPLY_FAILED)));
    }

    #[tokio::test]
    async fn test_expired_interaction_gets_no_notice() {
        let h = random_image_harness();
        h.responder.fail_next_follow_up(ReplyError::Rejected {
            status: 404,
            message: "Unknown interaction".into(),
        });

        h.router
            .handle(interaction("1", Command::RandomImage))
            .await;

        assert_eq!(h.responder.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_network_failure_gets_no_notice() {
        let h = random_image_harness();
        h.responder
            .fail_next_follow_up(ReplyError::network("connection reset"));

        h.router
            .handle(interaction("1", Command::RandomImage))
            .await;

        assert_eq!(h.responder.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_deauthorize_responds_directly() {
        let h = harness(MockImageHostPort::new(), MockDownloader::new());

        h.router
            .handle(interaction("1", Command::Deauthorize))
            .await;

        assert_eq!(
            h.responder.sent(),
            vec![Sent::Respond(Reply::ephemeral(messages::DEAUTHORIZE_SUCCESS))]
        );
        assert!(h.store.get(&UserId::from("1")).is_none());
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let h = harness(MockImageHostPort::new(), MockDownloader::new());

        h.router
            .handle(interaction(
                "1",
                Command::Unknown {
                    name: "ping".into(),
                },
            ))
            .await;

        assert_eq!(
            h.responder.sent(),
            vec![Sent::Respond(Reply::ephemeral(messages::UNKNOWN_COMMAND))]
        );
    }
}
