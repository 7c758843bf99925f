//! Command handlers.

mod authorize_use_case;
mod command_router;
mod deauthorize_use_case;
mod last_images_use_case;
mod random_image_use_case;
mod upload_image_use_case;

pub use authorize_use_case::AuthorizeUseCase;
pub use command_router::CommandRouter;
pub use deauthorize_use_case::DeauthorizeUseCase;
pub use last_images_use_case::{LastImagesJob, LastImagesUseCase};
pub use random_image_use_case::{RandomImageUseCase, pick_random};
pub use upload_image_use_case::{UploadImageUseCase, UploadJob, UploadSource};

use tracing::debug;

use crate::application::messages;
use crate::domain::entities::{AccessToken, Reply, UserId};
use crate::domain::ports::CredentialStorePort;

/// Looks up the caller's token, answering unauthorized users directly.
fn stored_token(
    credentials: &dyn CredentialStorePort,
    user_id: &UserId,
) -> Result<AccessToken, Reply> {
    credentials.get(user_id).ok_or_else(|| {
        debug!(user_id = %user_id, "No stored token");
        Reply::ephemeral(messages::NOT_AUTHORIZED)
    })
}
