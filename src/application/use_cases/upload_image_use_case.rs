//! Upload use case implementation.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::stored_token;
use crate::application::BotContext;
use crate::application::messages;
use crate::domain::entities::{AccessToken, AttachmentRef, ImageFile, Reply, UserId};
use crate::domain::ports::{CredentialStorePort, DownloaderPort, ImageHostPort};

/// Where the uploaded bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// Image at a user-supplied URL.
    Url(String),
    /// File attached to the command.
    Attachment(AttachmentRef),
}

/// Validated `upload` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    /// Token of the invoking user.
    pub token: AccessToken,
    /// Selected image source.
    pub source: UploadSource,
}

/// Uploads an image to the user's Gyazo account.
#[derive(Clone)]
pub struct UploadImageUseCase {
    credentials: Arc<dyn CredentialStorePort>,
    host: Arc<dyn ImageHostPort>,
    downloader: Arc<dyn DownloaderPort>,
}

impl UploadImageUseCase {
    /// Creates use case from the shared context.
    #[must_use]
    pub fn new(context: &BotContext) -> Self {
        Self {
            credentials: Arc::clone(&context.credentials),
            host: Arc::clone(&context.host),
            downloader: Arc::clone(&context.downloader),
        }
    }

    /// Checks authorization and picks the source.
    ///
    /// A non-blank URL wins over an attachment.
    ///
    /// # Errors
    /// Returns the immediate reply when the request cannot proceed.
    pub fn prepare(
        &self,
        user_id: &UserId,
        url: Option<String>,
        attachment: Option<AttachmentRef>,
    ) -> Result<UploadJob, Reply> {
        let token = stored_token(self.credentials.as_ref(), user_id)?;
        let url = url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        let source = match (url, attachment) {
            (Some(url), _) => UploadSource::Url(url),
            (None, Some(attachment)) => UploadSource::Attachment(attachment),
            (None, None) => return Err(Reply::ephemeral(messages::UPLOAD_MISSING_INPUT)),
        };
        Ok(UploadJob { token, source })
    }

    /// Reads the source and uploads it.
    pub async fn execute(&self, job: UploadJob) -> Reply {
        let file = match self.read_source(&job.source).await {
            Ok(file) => file,
            Err(reply) => return reply,
        };

        match self.host.upload_image(&job.token, file).await {
            Ok(uploaded) => match uploaded.hosted_url() {
                Some(url) => {
                    info!(url = %url, "Image uploaded");
                    Reply::public(messages::upload_success(url))
                }
                None => {
                    warn!("Upload response carried no URL");
                    Reply::public(messages::UPLOAD_NO_URL)
                }
            },
            Err(e) => {
                error!(error = %e, "Upload failed");
                Reply::public(messages::UPLOAD_FAILED)
            }
        }
    }

    async fn read_source(&self, source: &UploadSource) -> Result<ImageFile, Reply> {
        match source {
            UploadSource::Url(url) => self.downloader.download(url).await.map_err(|e| {
                warn!(error = %e, "Upload source download failed");
                Reply::public(messages::UPLOAD_URL_DOWNLOAD_FAILED)
            }),
            UploadSource::Attachment(attachment) => {
                let mut file = self
                    .downloader
                    .download(&attachment.url)
                    .await
                    .map_err(|e| {
                        warn!(attachment_id = %attachment.id, error = %e, "Attachment read failed");
                        Reply::public(messages::UPLOAD_ATTACHMENT_FAILED)
                    })?;
                if !attachment.filename.is_empty() {
                    file.filename.clone_from(&attachment.filename);
                }
                if attachment.content_type.is_some() {
                    file.content_type.clone_from(&attachment.content_type);
                }
                Ok(file)
            }
        }
    }
}
