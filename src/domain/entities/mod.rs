//! Domain entity definitions.

mod image;
mod interaction;
mod token;
mod user;

pub use image::{FALLBACK_FILE_NAME, Image, ImageFile, UploadedImage, file_name_from_url};
pub use interaction::{AttachmentRef, Command, Interaction, InteractionHandle, Reply};
pub use token::AccessToken;
pub use user::UserId;
