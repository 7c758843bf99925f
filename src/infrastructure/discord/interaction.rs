//! `INTERACTION_CREATE` payloads and their conversion to commands.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::entities::{AttachmentRef, Command, Interaction, InteractionHandle, UserId};

/// Interaction type for slash commands.
const APPLICATION_COMMAND: u8 = 2;

/// Raw interaction as delivered by the gateway.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct InteractionPayload {
    pub id: String,
    pub application_id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub token: String,
    pub data: Option<CommandData>,
    pub member: Option<MemberPayload>,
    pub user: Option<UserPayload>,
}

/// Invoked command with its arguments.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub resolved: ResolvedData,
}

/// Named argument value.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct CommandOption {
    pub name: String,
    pub value: Option<Value>,
}

/// Objects referenced by argument values.
#[derive(Debug, Default, Deserialize)]
pub struct ResolvedData {
    /// Attachments keyed by snowflake.
    #[serde(default)]
    pub attachments: HashMap<String, AttachmentPayload>,
}

/// Uploaded file metadata.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct AttachmentPayload {
    pub id: String,
    pub filename: String,
    pub url: String,
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: u64,
}

/// Guild member wrapper around the invoking user.
#[derive(Debug, Deserialize)]
pub struct MemberPayload {
    /// Invoking user.
    pub user: Option<UserPayload>,
}

/// Discord user reference.
#[derive(Debug, Deserialize)]
pub struct UserPayload {
    /// User snowflake.
    pub id: String,
}

impl InteractionPayload {
    /// Converts a slash-command interaction. Other interaction kinds yield `None`.
    #[must_use]
    pub fn into_interaction(self) -> Option<Interaction> {
        if self.kind != APPLICATION_COMMAND {
            return None;
        }
        // Guild invocations carry the user inside `member`, DMs carry it directly.
        let user = self
            .member
            .and_then(|member| member.user)
            .or(self.user)?;
        let data = self.data?;

        Some(Interaction {
            handle: InteractionHandle::new(self.id, self.application_id, self.token),
            user_id: UserId::new(user.id),
            command: data.into_command(),
        })
    }
}

impl CommandData {
    fn option(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .and_then(|option| option.value.as_ref())
    }

    fn string_option(&self, name: &str) -> Option<String> {
        self.option(name)?.as_str().map(str::to_owned)
    }

    fn attachment_option(&mut self, name: &str) -> Option<AttachmentRef> {
        let id = self.string_option(name)?;
        let attachment = self.resolved.attachments.remove(&id)?;
        Some(AttachmentRef {
            id: attachment.id,
            filename: attachment.filename,
            url: attachment.url,
            content_type: attachment.content_type,
            size: attachment.size,
        })
    }

    fn into_command(mut self) -> Command {
        let name = std::mem::take(&mut self.name);
        match name.as_str() {
            "authorize" => Command::Authorize {
                token: self.string_option("token"),
            },
            "deauthorize" => Command::Deauthorize,
            "lastimages" => Command::LastImages {
                count: self.option("count").and_then(Value::as_i64),
            },
            "randomimage" => Command::RandomImage,
            "upload" => Command::Upload {
                url: self.string_option("url"),
                attachment: self.attachment_option("image"),
            },
            _ => Command::Unknown { name },
        }
    }
}
