//! Authorize use case implementation.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::messages;
use crate::domain::entities::{AccessToken, Reply, UserId};
use crate::domain::ports::{CredentialStorePort, ImageHostPort};

/// Links a user to a Gyazo access token.
#[derive(Clone)]
pub struct AuthorizeUseCase {
    host: Arc<dyn ImageHostPort>,
    credentials: Arc<dyn CredentialStorePort>,
}

impl AuthorizeUseCase {
    /// Creates new authorize use case.
    #[must_use]
    pub fn new(host: Arc<dyn ImageHostPort>, credentials: Arc<dyn CredentialStorePort>) -> Self {
        Self { host, credentials }
    }

    /// Checks the command input before any network call.
    ///
    /// # Errors
    /// Returns the immediate reply when there is nothing to validate.
    pub fn prepare(&self, token: Option<&str>) -> Result<AccessToken, Reply> {
        let Some(raw) = token.filter(|t| !t.trim().is_empty()) else {
            return Err(Reply::ephemeral(messages::AUTHORIZE_INSTRUCTIONS));
        };
        AccessToken::new(raw).ok_or_else(|| {
            debug!("Token contains whitespace, rejecting without a request");
            Reply::ephemeral(messages::AUTHORIZE_FAILED)
        })
    }

    /// Validates the token with Gyazo and stores it.
    pub async fn execute(&self, user_id: &UserId, token: AccessToken) -> Reply {
        if let Err(e) = self.host.validate_token(&token).await {
            warn!(user_id = %user_id, error = %e, "Token validation failed");
            return Reply::ephemeral(messages::AUTHORIZE_FAILED);
        }

        match self.credentials.save(user_id, &token) {
            Ok(()) => {
                info!(user_id = %user_id, token = %token, "User authorized");
                Reply::ephemeral(messages::AUTHORIZE_SUCCESS)
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to persist token");
                Reply::ephemeral(messages::AUTHORIZE_SAVE_FAILED)
            }
        }
    }
}
