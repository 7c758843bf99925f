//! Slash-command invocations and the replies sent back for them.

use super::image::ImageFile;
use super::user::UserId;

/// Attachment referenced by a command option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    /// Attachment id.
    pub id: String,
    /// Original file name.
    pub filename: String,
    /// CDN URL the attachment can be read from.
    pub url: String,
    /// MIME type, when reported.
    pub content_type: Option<String>,
    /// Size in bytes.
    pub size: u64,
}

/// Bot command with its typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Link a Gyazo token, or print instructions when none is given.
    Authorize { token: Option<String> },
    /// Forget the stored token.
    Deauthorize,
    /// Send the most recent images.
    LastImages { count: Option<i64> },
    /// Send one random image.
    RandomImage,
    /// Upload an image from a URL or an attachment.
    Upload {
        url: Option<String>,
        attachment: Option<AttachmentRef>,
    },
    /// Command name this bot does not know.
    Unknown { name: String },
}

impl Command {
    /// Returns the registered command name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Authorize { .. } => "authorize",
            Self::Deauthorize => "deauthorize",
            Self::LastImages { .. } => "lastimages",
            Self::RandomImage => "randomimage",
            Self::Upload { .. } => "upload",
            Self::Unknown { name } => name,
        }
    }
}

/// Data needed to answer an interaction.
#[derive(Clone, PartialEq, Eq)]
pub struct InteractionHandle {
    /// Interaction id.
    pub id: String,
    /// Application the interaction was sent to.
    pub application_id: String,
    /// Continuation token for callbacks and follow-ups.
    pub token: String,
}

impl InteractionHandle {
    /// Creates a handle.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        application_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            application_id: application_id.into(),
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for InteractionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionHandle")
            .field("id", &self.id)
            .field("application_id", &self.application_id)
            .finish_non_exhaustive()
    }
}

/// A command invocation by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    /// Reply handle.
    pub handle: InteractionHandle,
    /// Invoking user.
    pub user_id: UserId,
    /// Parsed command.
    pub command: Command,
}

/// Message sent back to the invoking user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    /// Text content.
    pub content: String,
    /// Attached files.
    pub files: Vec<ImageFile>,
    /// Only visible to the invoking user.
    pub ephemeral: bool,
}

impl Reply {
    /// Creates a reply visible to the whole channel.
    #[must_use]
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            files: Vec::new(),
            ephemeral: false,
        }
    }

    /// Creates a reply only the invoking user sees.
    #[must_use]
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            files: Vec::new(),
            ephemeral: true,
        }
    }

    /// Attaches files.
    #[must_use]
    pub fn with_files(mut self, files: Vec<ImageFile>) -> Self {
        self.files = files;
        self
    }
}
