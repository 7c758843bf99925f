//! Discord REST client for command registration and interaction replies.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode, header};
use serde::Serialize;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::dto::{AttachmentBody, CommandDefinition, ErrorResponse, InteractionCallback, MessageBody};
use crate::domain::entities::{ImageFile, InteractionHandle, Reply};
use crate::domain::errors::ReplyError;
use crate::domain::ports::ResponderPort;

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const USER_AGENT: &str = concat!(
    "DiscordBot (",
    env!("CARGO_PKG_NAME"),
    ", ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

const CHANNEL_MESSAGE: u8 = 4;
const DEFERRED_CHANNEL_MESSAGE: u8 = 5;
const EPHEMERAL_FLAG: u64 = 1 << 6;

/// Bot-authenticated Discord HTTP client.
pub struct DiscordRestClient {
    client: Client,
    base_url: String,
    bot_token: Zeroizing<String>,
}

impl DiscordRestClient {
    /// Creates client against the public API.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(bot_token: impl Into<String>, timeout: Duration) -> Result<Self, ReplyError> {
        Self::with_base_url(DISCORD_API_BASE, bot_token, timeout)
    }

    /// Creates client with custom base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_base_url(
        base_url: impl Into<String>,
        bot_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ReplyError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ReplyError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bot_token: Zeroizing::new(bot_token.into()),
        })
    }

    /// Replaces the global command set of the application.
    ///
    /// # Errors
    /// Returns error if Discord rejects the definitions or is unreachable.
    pub async fn register_commands(
        &self,
        application_id: &str,
        commands: &[CommandDefinition],
    ) -> Result<(), ReplyError> {
        let url = format!("{}/applications/{application_id}/commands", self.base_url);

        let request = self
            .client
            .put(&url)
            .header(header::AUTHORIZATION, format!("Bot {}", self.bot_token.as_str()))
            .json(commands);
        Self::send(request).await?;

        debug!(count = commands.len(), "Registered application commands");
        Ok(())
    }

    fn callback_url(&self, handle: &InteractionHandle) -> String {
        format!(
            "{}/interactions/{}/{}/callback",
            self.base_url, handle.id, handle.token
        )
    }

    fn webhook_url(&self, handle: &InteractionHandle) -> String {
        format!(
            "{}/webhooks/{}/{}",
            self.base_url, handle.application_id, handle.token
        )
    }

    /// Posts JSON, or multipart with `payload_json` when files are attached.
    async fn post<T: Serialize + Sync>(
        &self,
        url: &str,
        payload: &T,
        files: &[ImageFile],
    ) -> Result<(), ReplyError> {
        let request = self.client.post(url);
        let request = if files.is_empty() {
            request.json(payload)
        } else {
            request.multipart(multipart_form(payload, files)?)
        };
        Self::send(request).await
    }

    async fn send(request: RequestBuilder) -> Result<(), ReplyError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Failed to reach Discord");
            if e.is_timeout() {
                ReplyError::network("request timed out")
            } else if e.is_connect() {
                ReplyError::network("failed to connect to Discord")
            } else {
                ReplyError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::handle_error_response(status, response).await)
    }

    async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> ReplyError {
        let message = match response.json::<ErrorResponse>().await {
            Ok(error) => error.message,
            Err(_) => format!("HTTP {status}"),
        };

        ReplyError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

fn message_body(reply: &Reply) -> MessageBody<'_> {
    MessageBody {
        content: Some(reply.content.as_str()),
        flags: if reply.ephemeral { EPHEMERAL_FLAG } else { 0 },
        attachments: reply
            .files
            .iter()
            .enumerate()
            .map(|(id, file)| AttachmentBody {
                id,
                filename: &file.filename,
            })
            .collect(),
    }
}

fn multipart_form<T: Serialize>(payload: &T, files: &[ImageFile]) -> Result<Form, ReplyError> {
    let payload_json =
        serde_json::to_string(payload).map_err(|e| ReplyError::encoding(e.to_string()))?;
    let mut form = Form::new().text("payload_json", payload_json);

    for (index, file) in files.iter().enumerate() {
        let mut part = Part::bytes(file.data.to_vec()).file_name(file.filename.clone());
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| ReplyError::encoding(format!("bad content type: {e}")))?;
        }
        form = form.part(format!("files[{index}]"), part);
    }

    Ok(form)
}

#[async_trait]
impl ResponderPort for DiscordRestClient {
    async fn respond(&self, handle: &InteractionHandle, reply: Reply) -> Result<(), ReplyError> {
        let callback = InteractionCallback {
            kind: CHANNEL_MESSAGE,
            data: message_body(&reply),
        };
        self.post(&self.callback_url(handle), &callback, &reply.files)
            .await
    }

    async fn defer(&self, handle: &InteractionHandle, ephemeral: bool) -> Result<(), ReplyError> {
        let callback = InteractionCallback {
            kind: DEFERRED_CHANNEL_MESSAGE,
            data: MessageBody {
                flags: if ephemeral { EPHEMERAL_FLAG } else { 0 },
                ..MessageBody::default()
            },
        };
        self.post(&self.callback_url(handle), &callback, &[]).await
    }

    async fn follow_up(
        &self,
        handle: &InteractionHandle,
        reply: Reply,
    ) -> Result<(), ReplyError> {
        debug!(files = reply.files.len(), "Sending follow-up");
        self.post(&self.webhook_url(handle), &message_body(&reply), &reply.files)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::infrastructure::discord::commands::command_definitions;

    fn client(server: &MockServer) -> DiscordRestClient {
        DiscordRestClient::with_base_url(server.uri(), "bot-token", Duration::from_secs(5)).unwrap()
    }

    fn handle() -> InteractionHandle {
        InteractionHandle::new("111", "222", "interaction-token")
    }

    #[tokio::test]
    async fn test_respond_ephemeral_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/interactions/111/interaction-token/callback"))
            .and(body_json(json!({
                "type": 4,
                "data": {"content": "Not authorized", "flags": 64}
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .respond(&handle(), Reply::ephemeral("Not authorized"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_defer_public() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/interactions/111/interaction-token/callback"))
            .and(body_json(json!({"type": 5, "data": {}})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).defer(&handle(), false).await.unwrap();
    }

    #[tokio::test]
    async fn test_follow_up_with_files_is_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhooks/222/interaction-token"))
            .and(body_string_contains("name=\"payload_json\""))
            .and(body_string_contains(
                r#""attachments":[{"id":0,"filename":"a.png"},{"id":1,"filename":"b.jpg"}]"#,
            ))
            .and(body_string_contains("name=\"files[1]\"; filename=\"b.jpg\""))
            .and(body_string_contains("PNGDATA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "9"})))
            .expect(1)
            .mount(&server)
            .await;

        let reply = Reply::public("Here are your 2 images:").with_files(vec![
            ImageFile::new("a.png", &b"PNGDATA"[..]).with_content_type("image/png"),
            ImageFile::new("b.jpg", &b"JPGDATA"[..]),
        ]);

        client(&server).follow_up(&handle(), reply).await.unwrap();
    }

    #[tokio::test]
    async fn test_follow_up_text_only_is_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhooks/222/interaction-token"))
            .and(body_json(json!({"content": "No images found."})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "9"})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .follow_up(&handle(), Reply::public("No images found."))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unknown_interaction_is_expired() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Unknown interaction"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .respond(&handle(), Reply::public("late"))
            .await
            .unwrap_err();

        assert!(err.is_expired_interaction());
        assert!(err.to_string().contains("Unknown interaction"));
    }

    #[tokio::test]
    async fn test_register_commands_uses_bot_auth() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/applications/222/commands"))
            .and(header("authorization", "Bot bot-token"))
            .and(body_string_contains("\"lastimages\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .register_commands("222", &command_definitions())
            .await
            .unwrap();
    }
}
