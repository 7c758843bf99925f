//! Interaction reply port definition.

use async_trait::async_trait;

use crate::domain::entities::{InteractionHandle, Reply};
use crate::domain::errors::ReplyError;

/// Port for answering command interactions.
#[async_trait]
pub trait ResponderPort: Send + Sync {
    /// Sends the initial response.
    async fn respond(&self, handle: &InteractionHandle, reply: Reply) -> Result<(), ReplyError>;

    /// Acknowledges the interaction and shows a pending state.
    ///
    /// The final answer must then go through [`ResponderPort::follow_up`].
    async fn defer(&self, handle: &InteractionHandle, ephemeral: bool) -> Result<(), ReplyError>;

    /// Sends the answer to a deferred interaction.
    async fn follow_up(&self, handle: &InteractionHandle, reply: Reply)
    -> Result<(), ReplyError>;
}
