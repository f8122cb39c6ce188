//! Decentralized storage uploader.
//!
//! Token metadata and images are pushed to a storage uploader that returns a
//! permanent id. `HttpUploader` talks to any service exposing
//! `POST {base}/upload` and answering with `{"id": ..}` or `{"uri": ..}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Error type for upload operations.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Uploader returned an error.
    #[error("uploader error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Uploader answered without an id or uri.
    #[error("uploader response has neither id nor uri")]
    MissingLocation,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Storage backend for uploaded files.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload raw bytes and return their public URI.
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, UploadError>;

    /// Upload a JSON document and return its public URI.
    async fn upload_json(&self, value: &serde_json::Value) -> Result<String, UploadError> {
        let bytes = serde_json::to_vec(value)?;
        self.upload(bytes, "application/json").await
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    uri: Option<String>,
}

/// HTTP uploader client.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: Client,
    base_url: String,
    gateway: String,
    api_key: Option<String>,
}

impl HttpUploader {
    /// Create a new uploader client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Uploader API URL
    /// * `gateway` - Public gateway that serves content by id
    /// * `api_key` - Optional bearer token
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Configuration` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        gateway: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| UploadError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            gateway: gateway.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, UploadError> {
        let url = format!("{}/upload", self.base_url);
        let size = bytes.len();

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", content_type)
            .body(bytes);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        let uri = match (body.uri, body.id) {
            (Some(uri), _) => uri,
            (None, Some(id)) => format!("{}/{id}", self.gateway),
            (None, None) => return Err(UploadError::MissingLocation),
        };

        tracing::debug!(size, content_type, uri = %uri, "Uploaded file");
        Ok(uri)
    }
}
