//! Relay client for the imgbb image host
//!
//! Exported posters are forwarded here as base64 payloads; imgbb answers
//! with a public URL that gets recorded on the user's account.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::constants::FETCH_TIMEOUT_SECS;

#[derive(Debug)]
pub enum ImgbbError {
    /// IMGBB_API_KEY was never configured on the server.
    MissingKey,
    Http(String),
    /// imgbb answered but refused the image.
    Rejected(String),
}

impl std::fmt::Display for ImgbbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImgbbError::MissingKey => write!(f, "imgbb API key is not configured"),
            ImgbbError::Http(e) => write!(f, "imgbb request failed: {}", e),
            ImgbbError::Rejected(msg) => write!(f, "imgbb rejected the upload: {}", msg),
        }
    }
}

impl std::error::Error for ImgbbError {}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadData>,
    error: Option<UploadError>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadError {
    message: Option<String>,
}

#[derive(Clone)]
pub struct ImgbbClient {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl ImgbbClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, "https://api.imgbb.com".to_string())
    }

    fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .expect("Failed to build imgbb HTTP client");

        Self {
            api_key,
            base_url,
            http,
        }
    }

    /// Upload a base64-encoded image (no data-URL prefix) under the given
    /// filename. Returns the hosted URL.
    pub async fn upload_base64(
        &self,
        base64_data: &str,
        filename: &str,
    ) -> Result<String, ImgbbError> {
        let api_key = self.api_key.as_deref().ok_or(ImgbbError::MissingKey)?;

        let form = reqwest::multipart::Form::new()
            .text("image", base64_data.to_string())
            .text("name", filename.to_string());

        let url = format!("{}/1/upload?key={}", self.base_url, api_key);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImgbbError::Http(e.to_string()))?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ImgbbError::Http(e.to_string()))?;

        if body.success {
            if let Some(data) = body.data {
                return Ok(data.url);
            }
        }

        let message = body
            .error
            .and_then(|e| e.message)
            .unwrap_or_else(|| "unknown error".to_string());
        Err(ImgbbError::Rejected(message))
    }
}
