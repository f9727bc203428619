//! Remove.bg API client
//!
//! Sends a JPEG as multipart form data and returns the cut-out image bytes.
//! No retries at this layer: callers treat any error as "no result".

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use thiserror::Error;

pub const REMOVEBG_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";
const USER_AGENT: &str = concat!("Possessao/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Remove.bg client errors
#[derive(Debug, Error)]
pub enum RemoveBgError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Empty response body")]
    EmptyResponse,

    #[error("Could not read image: {0}")]
    Decode(String),

    #[error("No API key configured")]
    NotConfigured,
}

/// Remove.bg API client
#[derive(Debug, Clone)]
pub struct RemoveBgClient {
    http_client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl RemoveBgClient {
    pub fn new(api_key: String) -> Result<Self, RemoveBgError> {
        Self::with_endpoint(api_key, REMOVEBG_ENDPOINT.to_string())
    }

    /// Client against a non-default endpoint (self-hosted proxies, tests)
    pub fn with_endpoint(api_key: String, endpoint: String) -> Result<Self, RemoveBgError> {
        if api_key.trim().is_empty() {
            return Err(RemoveBgError::NotConfigured);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RemoveBgError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            endpoint,
        })
    }

    /// Client from optional configuration, `None` when no key is set
    pub fn from_config(api_key: Option<String>, endpoint: Option<String>) -> Option<Self> {
        let api_key = api_key?;
        let endpoint = endpoint.unwrap_or_else(|| REMOVEBG_ENDPOINT.to_string());
        match Self::with_endpoint(api_key, endpoint) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "Remove.bg client unavailable");
                None
            }
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Remove the background of the JPEG at `image_path`.
    ///
    /// Returns the encoded result image (PNG with alpha on success).
    pub async fn remove_background(&self, image_path: &Path) -> Result<Vec<u8>, RemoveBgError> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| RemoveBgError::Decode(e.to_string()))?;
        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo.jpg".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/jpeg")
            .map_err(|e| RemoveBgError::Network(e.to_string()))?;
        let form = Form::new().part("image_file", part).text("size", "auto");

        tracing::debug!(endpoint = %self.endpoint, "Sending image to Remove.bg");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("X-Api-Key", self.api_key.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(|e| RemoveBgError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RemoveBgError::Api(status.as_u16(), error_text));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RemoveBgError::Network(e.to_string()))?;
        if body.is_empty() {
            return Err(RemoveBgError::EmptyResponse);
        }

        tracing::info!(bytes = body.len(), "Remove.bg background removed");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = RemoveBgClient::new("test_key".to_string()).unwrap();
        assert_eq!(client.endpoint(), REMOVEBG_ENDPOINT);
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        assert!(matches!(
            RemoveBgClient::new("   ".to_string()),
            Err(RemoveBgError::NotConfigured)
        ));
        assert!(RemoveBgClient::from_config(None, None).is_none());
        assert!(RemoveBgClient::from_config(Some(String::new()), None).is_none());
    }

    #[test]
    fn test_custom_endpoint() {
        let client =
            RemoveBgClient::from_config(Some("k".to_string()), Some("http://127.0.0.1:9/x".to_string()))
                .unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/x");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"jpeg bytes").unwrap();

        // Port 9 (discard) is closed on test hosts
        let client =
            RemoveBgClient::with_endpoint("k".to_string(), "http://127.0.0.1:9/removebg".to_string()).unwrap();
        let err = client.remove_background(&path).await.unwrap_err();
        assert!(matches!(err, RemoveBgError::Network(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_decode_error() {
        let client = RemoveBgClient::new("k".to_string()).unwrap();
        let err = client
            .remove_background(Path::new("/nonexistent/photo.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoveBgError::Decode(_)));
    }
}
