//! Domain error types.

mod api_error;
mod reply_error;
mod store_error;

pub use api_error::{ApiError, DownloadError};
pub use reply_error::ReplyError;
pub use store_error::StoreError;
