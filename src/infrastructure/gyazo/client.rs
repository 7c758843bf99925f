//! Gyazo API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::dto::ErrorResponse;
use crate::domain::entities::{AccessToken, Image, ImageFile, UploadedImage};
use crate::domain::errors::ApiError;
use crate::domain::ports::ImageHostPort;

const USER_AGENT: &str = concat!("gyazo-bot/", env!("CARGO_PKG_VERSION"));

/// Gyazo listing and upload client.
pub struct GyazoClient {
    client: Client,
    api_base: String,
    upload_url: String,
}

impl GyazoClient {
    /// Creates client against the given endpoints.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(
        api_base: impl Into<String>,
        upload_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            upload_url: upload_url.into(),
        })
    }

    fn images_url(&self) -> String {
        format!("{}/api/images", self.api_base)
    }

    async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> ApiError {
        let message = match response.json::<ErrorResponse>().await {
            Ok(error) => error.message,
            Err(_) => format!("HTTP {status}"),
        };

        match status {
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                ApiError::network("Gyazo API is temporarily unavailable")
            }
            _ => ApiError::rejected(status.as_u16(), message),
        }
    }
}

fn map_send_error(e: &reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::network("request timed out")
    } else if e.is_connect() {
        ApiError::network("failed to connect to Gyazo")
    } else {
        ApiError::network(e.to_string())
    }
}

#[async_trait]
impl ImageHostPort for GyazoClient {
    async fn validate_token(&self, token: &AccessToken) -> Result<(), ApiError> {
        debug!(token = %token, "Validating token against Gyazo");

        let response = self
            .client
            .get(self.images_url())
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| map_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }
        Ok(())
    }

    async fn list_images(
        &self,
        token: &AccessToken,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Image>, ApiError> {
        let response = self
            .client
            .get(self.images_url())
            .bearer_auth(token.as_str())
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await
            .map_err(|e| {
                warn!(page, error = %e, "Failed to reach Gyazo");
                map_send_error(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }

        response.json::<Vec<Image>>().await.map_err(|e| {
            warn!(page, error = %e, "Failed to parse image listing");
            ApiError::invalid_response(format!("failed to parse image listing: {e}"))
        })
    }

    async fn upload_image(
        &self,
        token: &AccessToken,
        file: ImageFile,
    ) -> Result<UploadedImage, ApiError> {
        debug!(file = %file.filename, size = file.len(), "Uploading image to Gyazo");

        let mut part = Part::bytes(file.data.to_vec()).file_name(file.filename.clone());
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| ApiError::invalid_response(format!("bad content type: {e}")))?;
        }
        let form = Form::new()
            .text("access_token", token.as_str().to_string())
            .part("imagedata", part);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| map_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }

        response.json::<UploadedImage>().await.map_err(|e| {
            warn!(error = %e, "Failed to parse upload response");
            ApiError::invalid_response(format!("failed to parse upload response: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GyazoClient {
        GyazoClient::new(
            server.uri(),
            format!("{}/api/upload", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn token() -> AccessToken {
        AccessToken::new_unchecked("gyazo-token")
    }

    #[tokio::test]
    async fn test_list_images_sends_paging_and_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/images"))
            .and(query_param("page", "2"))
            .and(query_param("per_page", "20"))
            .and(header("authorization", "Bearer gyazo-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "image_id": "abc",
                    "permalink_url": "https://gyazo.com/abc",
                    "url": "https://i.gyazo.com/abc.png",
                    "thumb_url": "https://thumb.gyazo.com/abc.png",
                    "type": "png",
                    "created_at": "2024-01-01T00:00:00+0000",
                    "metadata": {"app": "Chrome"}
                },
                {"image_id": "def", "url": "", "thumb_url": "https://thumb.gyazo.com/def.jpg"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let images = client(&server).list_images(&token(), 2, 20).await.unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].kind.as_deref(), Some("png"));
        assert_eq!(
            images[1].source_url(),
            Some("https://thumb.gyazo.com/def.jpg")
        );
    }

    #[tokio::test]
    async fn test_validate_token_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/images"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "You are not authorized."})),
            )
            .mount(&server)
            .await;

        let err = client(&server).validate_token(&token()).await.unwrap_err();

        assert!(err.is_auth_failure());
        assert!(err.to_string().contains("You are not authorized."));
    }

    #[tokio::test]
    async fn test_validate_token_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/images"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert!(client(&server).validate_token(&token()).await.is_ok());
    }

    #[tokio::test]
    async fn test_rate_limit_and_bad_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        let client = client(&server);

        assert!(matches!(
            client.list_images(&token(), 1, 20).await,
            Err(ApiError::RateLimited)
        ));
        assert!(matches!(
            client.list_images(&token(), 2, 20).await,
            Err(ApiError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_upload_sends_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .and(body_string_contains("name=\"access_token\""))
            .and(body_string_contains("gyazo-token"))
            .and(body_string_contains("name=\"imagedata\"; filename=\"cat.png\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "image_id": "xyz",
                "permalink_url": "https://gyazo.com/xyz",
                "url": "https://i.gyazo.com/xyz.png",
                "thumb_url": "https://thumb.gyazo.com/xyz.png",
                "type": "png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = ImageFile::new("cat.png", b"png-bytes".to_vec()).with_content_type("image/png");
        let uploaded = client(&server).upload_image(&token(), file).await.unwrap();

        assert_eq!(uploaded.hosted_url(), Some("https://i.gyazo.com/xyz.png"));
    }

    #[tokio::test]
    async fn test_upload_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let file = ImageFile::new("cat.png", b"png".to_vec());
        let err = client(&server).upload_image(&token(), file).await.unwrap_err();

        assert!(matches!(err, ApiError::Rejected { status: 500, .. }));
    }
}
