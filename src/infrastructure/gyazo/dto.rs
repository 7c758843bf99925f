use serde::Deserialize;

/// Gyazo API error body.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error message from Gyazo.
    pub message: String,
}
