//! Deauthorize use case implementation.

use std::sync::Arc;

use tracing::{error, info};

use crate::application::messages;
use crate::domain::entities::{Reply, UserId};
use crate::domain::ports::CredentialStorePort;

/// Forgets a user's stored token.
#[derive(Clone)]
pub struct DeauthorizeUseCase {
    credentials: Arc<dyn CredentialStorePort>,
}

impl DeauthorizeUseCase {
    /// Creates new deauthorize use case.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStorePort>) -> Self {
        Self { credentials }
    }

    /// Deletes the token and reports whether one existed.
    #[must_use]
    pub fn execute(&self, user_id: &UserId) -> Reply {
        match self.credentials.delete(user_id) {
            Ok(true) => {
                info!(user_id = %user_id, "User deauthorized");
                Reply::ephemeral(messages::DEAUTHORIZE_SUCCESS)
            }
            Ok(false) => Reply::ephemeral(messages::DEAUTHORIZE_NOT_FOUND),
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to delete token");
                Reply::ephemeral(messages::DEAUTHORIZE_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockCredentialStore;

    #[test]
    fn test_deauthorize_twice() {
        let store = Arc::new(MockCredentialStore::with_token("7", "tok"));
        let uc = DeauthorizeUseCase::new(store.clone());
        let user = UserId::from("7");

        assert_eq!(uc.execute(&user).content, messages::DEAUTHORIZE_SUCCESS);
        assert!(store.get(&user).is_none());
        assert_eq!(uc.execute(&user).content, messages::DEAUTHORIZE_NOT_FOUND);
    }

    #[test]
    fn test_write_failure_keeps_reply_ephemeral() {
        let store = Arc::new(MockCredentialStore::with_token("7", "tok"));
        store.set_fail_writes(true);
        let uc = DeauthorizeUseCase::new(store);

        let reply = uc.execute(&UserId::from("7"));
        assert!(reply.ephemeral);
        assert_eq!(reply.content, messages::DEAUTHORIZE_FAILED);
    }
}
