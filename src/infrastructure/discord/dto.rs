//! Discord REST request and response bodies.

use serde::{Deserialize, Serialize};

/// Discord API error response structure.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error message from Discord.
    pub message: String,
}

/// Global application command as sent to the bulk overwrite endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CommandDefinition {
    /// Command name as typed after the slash.
    pub name: &'static str,
    /// Description shown in the command picker.
    pub description: &'static str,
    /// Command type, 1 for chat input.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Command arguments.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionDefinition>,
}

/// Single argument of a slash command.
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct CommandOptionDefinition {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// Body of an interaction callback.
#[derive(Debug, Serialize)]
#[allow(missing_docs)]
pub struct InteractionCallback<'a> {
    #[serde(rename = "type")]
    pub kind: u8,
    pub data: MessageBody<'a>,
}

/// Message content shared by callbacks and follow-ups.
#[derive(Debug, Default, Serialize)]
#[allow(missing_docs)]
pub struct MessageBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'a str>,
    #[serde(skip_serializing_if = "is_zero")]
    pub flags: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentBody<'a>>,
}

/// Links a multipart `files[n]` part to the message.
#[derive(Debug, Serialize)]
#[allow(missing_docs)]
pub struct AttachmentBody<'a> {
    pub id: usize,
    pub filename: &'a str,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u64) -> bool {
    *value == 0
}
