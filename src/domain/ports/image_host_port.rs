//! Image host port definition.

use async_trait::async_trait;

use crate::domain::entities::{AccessToken, Image, ImageFile, UploadedImage};
use crate::domain::errors::ApiError;

/// Port for the remote image hosting service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageHostPort: Send + Sync {
    /// Checks that the host accepts the token.
    async fn validate_token(&self, token: &AccessToken) -> Result<(), ApiError>;

    /// Lists one page of the token owner's images, newest first.
    ///
    /// Pages start at 1. An empty page marks the end of the collection.
    async fn list_images(
        &self,
        token: &AccessToken,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Image>, ApiError>;

    /// Uploads image bytes on behalf of the token owner.
    async fn upload_image(
        &self,
        token: &AccessToken,
        file: ImageFile,
    ) -> Result<UploadedImage, ApiError>;
}
