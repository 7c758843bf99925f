//! User-facing reply texts.

#![allow(missing_docs)]

/// Steps for obtaining a Gyazo access token.
pub const AUTHORIZE_INSTRUCTIONS: &str = "To authorize this bot to access your Gyazo images, follow these steps:\n\
1. Visit the Gyazo API Documentation: https://gyazo.com/oauth/applications\n\
2. Log in if you haven't already.\n\
3. Create an Application and generate an access token.\n\
4. Copy the token and use `/authorize <token>` to authorize the bot.";

pub const AUTHORIZE_SUCCESS: &str = "Authorization successful! Your Gyazo token has been saved.";
pub const AUTHORIZE_FAILED: &str = "Authorization failed. Please check your token and try again.";
pub const AUTHORIZE_SAVE_FAILED: &str =
    "Your token was accepted by Gyazo but could not be saved. Please try again later.";

pub const DEAUTHORIZE_SUCCESS: &str = "Your Gyazo token has been removed.";
pub const DEAUTHORIZE_NOT_FOUND: &str = "You haven't authorized the bot, nothing to remove.";
pub const DEAUTHORIZE_FAILED: &str = "Failed to remove your Gyazo token. Please try again later.";

pub const NOT_AUTHORIZED: &str =
    "You haven't authorized the bot yet. Use the `/authorize <your_token>` command first.";

pub const INVALID_COUNT: &str = "Please specify a number of images greater than 0.";
pub const NO_IMAGES: &str = "No images found.";
pub const NO_VALID_IMAGES: &str = "No valid images to send.";
pub const RANDOM_IMAGE: &str = "Here is a random image:";
pub const NO_VALID_URL: &str = "No valid image URL found.";
pub const RANDOM_DOWNLOAD_FAILED: &str = "Failed to download the image.";

pub const UPLOAD_MISSING_INPUT: &str = "Please provide an image URL or attach an image to upload.";
pub const UPLOAD_URL_DOWNLOAD_FAILED: &str = "Failed to download the image from the provided URL.";
pub const UPLOAD_ATTACHMENT_FAILED: &str = "Failed to read the attached image.";
pub const UPLOAD_FAILED: &str = "Upload to Gyazo failed. Please try again later.";
pub const UPLOAD_NO_URL: &str = "Upload finished, but Gyazo did not return an image URL.";

pub const UNKNOWN_COMMAND: &str = "Unknown command.";
pub const REPLY_FAILED: &str = "Something went wrong while sending the result. Please try again.";

/// Caption for a batch of recent images.
#[must_use]
pub fn last_images(count: usize) -> String {
    format!("Here are your {count} images:")
}

/// Reply for a finished upload.
#[must_use]
pub fn upload_success(url: &str) -> String {
    format!("Image uploaded to Gyazo: {url}")
}
