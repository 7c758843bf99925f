use super::constants::GATEWAY_QUERY;

/// What survives a dropped connection so it can be resumed.
#[derive(Debug, Clone, Default)]
pub struct SessionInfo {
    session_id: Option<String>,
    resume_gateway_url: Option<String>,
    sequence: Option<u64>,
}

impl SessionInfo {
    /// Empty session, forcing a fresh Identify.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session_id: None,
            resume_gateway_url: None,
            sequence: None,
        }
    }

    /// Records the session handed out in Ready.
    pub fn set_session(&mut self, session_id: String, resume_url: Option<String>) {
        self.session_id = Some(session_id);
        self.resume_gateway_url = resume_url;
    }

    /// Keeps the last sequence number seen; `None` leaves it unchanged.
    pub const fn update_sequence(&mut self, sequence: Option<u64>) {
        if let Some(seq) = sequence {
            self.sequence = Some(seq);
        }
    }

    /// Current session id.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Last sequence number seen.
    #[must_use]
    pub const fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    /// Resume URL with the gateway query appended, when one was handed out.
    #[must_use]
    pub fn resume_url(&self) -> Option<String> {
        let base = self.resume_gateway_url.as_deref()?;
        Some(format!("{}/{GATEWAY_QUERY}", base.trim_end_matches('/')))
    }

    /// Whether enough state exists to send Resume.
    #[must_use]
    pub const fn can_resume(&self) -> bool {
        self.session_id.is_some() && self.sequence.is_some()
    }

    /// Forgets the session.
    pub fn clear(&mut self) {
        self.session_id = None;
        self.resume_gateway_url = None;
        self.sequence = None;
    }
}
