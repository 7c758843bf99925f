//! Hosted image records and downloaded image payloads.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// File name used when a URL has no usable last path segment.
pub const FALLBACK_FILE_NAME: &str = "image.png";

/// Image record as listed by the image host.
///
/// Only the two URLs matter to the bot; the remaining fields are carried
/// through untouched. Any of them may be missing or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Host-side image identifier.
    #[serde(default)]
    pub image_id: Option<String>,
    /// Page URL on the host.
    #[serde(default)]
    pub permalink_url: Option<String>,
    /// Direct URL of the full-size image.
    #[serde(default)]
    pub url: Option<String>,
    /// Direct URL of the thumbnail.
    #[serde(default)]
    pub thumb_url: Option<String>,
    /// Image format, e.g. `png`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Creation timestamp as reported by the host.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Image {
    /// Creates an image with a primary and thumbnail URL.
    #[must_use]
    pub fn new(url: Option<&str>, thumb_url: Option<&str>) -> Self {
        Self {
            url: url.map(String::from),
            thumb_url: thumb_url.map(String::from),
            ..Self::default()
        }
    }

    /// Returns the URL to download: the primary URL, else the thumbnail.
    #[must_use]
    pub fn source_url(&self) -> Option<&str> {
        non_empty(self.url.as_deref()).or_else(|| non_empty(self.thumb_url.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Result of a successful upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Host-side image identifier.
    #[serde(default)]
    pub image_id: Option<String>,
    /// Page URL on the host.
    #[serde(default)]
    pub permalink_url: Option<String>,
    /// Direct URL of the uploaded image.
    #[serde(default)]
    pub url: Option<String>,
    /// Direct URL of the thumbnail.
    #[serde(default)]
    pub thumb_url: Option<String>,
}

impl UploadedImage {
    /// Returns the URL to hand back to the user.
    #[must_use]
    pub fn hosted_url(&self) -> Option<&str> {
        non_empty(self.url.as_deref()).or_else(|| non_empty(self.permalink_url.as_deref()))
    }
}

/// Binary image payload ready to be attached or uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name presented to the receiver.
    pub filename: String,
    /// MIME type, when known.
    pub content_type: Option<String>,
    /// Raw bytes.
    pub data: Bytes,
}

impl ImageFile {
    /// Creates a payload.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Sets the MIME type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true for an empty payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Derives a file name from the last path segment of a URL.
#[must_use]
pub fn file_name_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();

    // Drop scheme and authority so a bare host is never taken as a file name.
    let path = without_query
        .split_once("://")
        .map_or(without_query, |(_, rest)| {
            rest.split_once('/').map_or("", |(_, path)| path)
        });

    path.rsplit('/')
        .next()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map_or_else(|| FALLBACK_FILE_NAME.to_string(), String::from)
}
