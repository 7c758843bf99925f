use crate::domain::entities::Interaction;

/// Dispatch events this bot reacts to.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum DispatchEvent {
    /// Session established.
    Ready {
        session_id: String,
        resume_gateway_url: Option<String>,
        user_id: String,
        application_id: String,
    },
    /// Slash command invoked.
    InteractionCreate {
        interaction: Interaction,
    },
    /// Any other dispatch.
    Unknown {
        event_type: String,
    },
}

impl DispatchEvent {
    /// Gateway event name.
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::Ready { .. } => "READY",
            Self::InteractionCreate { .. } => "INTERACTION_CREATE",
            Self::Unknown { event_type } => event_type,
        }
    }
}

/// Everything the gateway task reports to its owner.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum GatewayEventKind {
    Connected {
        session_id: String,
    },
    Disconnected {
        reason: String,
        can_resume: bool,
    },
    Reconnecting {
        attempt: u32,
    },
    Resumed,
    Dispatch(DispatchEvent),
    Error {
        message: String,
        recoverable: bool,
    },
}
