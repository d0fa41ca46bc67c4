//! Blocking client for the PosterForge API

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

/// Errors that can occur while talking to the API.
#[derive(Debug)]
pub enum ApiError {
    Http(reqwest::Error),
    UnexpectedStatus { status: StatusCode, message: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http(err) => write!(f, "http error: {err}"),
            ApiError::UnexpectedStatus { status, message } => {
                write!(f, "{message} ({status})")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        ApiError::Http(value)
    }
}

/// User projection as the API reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProjection {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub is_premium: bool,
}

/// Payload of a successful `/get-video-info` call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfoResponse {
    pub title: String,
    pub thumbnail_url: String,
    pub colors: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProjection,
}

#[derive(Debug, Deserialize)]
struct PremiumResponse {
    user: UserProjection,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct PostersResponse {
    posters: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Blocking API client that knows how to hit PosterForge's endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    auth_token: Option<String>,
}

impl ApiClient {
    /// Create a new client targeting the provided base URL.
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            auth_token,
        })
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Map non-2xx responses to `UnexpectedStatus`, pulling the server's
    /// `{ "error": ... }` body through when it has one.
    fn expect_success(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .map(|body| body.error)
            .unwrap_or_else(|_| "no error detail".to_string());

        Err(ApiError::UnexpectedStatus { status, message })
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/register", self.base_url))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
            }))
            .send()?;

        Self::expect_success(response)?;
        Ok(())
    }

    pub fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self
            .http
            .post(format!("{}/login", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()?;

        Ok(Self::expect_success(response)?.json()?)
    }

    pub fn video_info(&self, youtube_url: &str) -> Result<VideoInfoResponse, ApiError> {
        let request = self
            .http
            .post(format!("{}/get-video-info", self.base_url))
            .json(&serde_json::json!({ "youtubeUrl": youtube_url }));
        let response = self.with_auth(request).send()?;

        Ok(Self::expect_success(response)?.json()?)
    }

    /// Fetch the persisted user projection. The premium gate calls this at
    /// click-time instead of trusting the session file.
    pub fn me(&self) -> Result<UserProjection, ApiError> {
        let request = self.http.get(format!("{}/me", self.base_url));
        let response = self.with_auth(request).send()?;

        Ok(Self::expect_success(response)?.json()?)
    }

    pub fn upgrade(&self) -> Result<UserProjection, ApiError> {
        let request = self
            .http
            .post(format!("{}/update-to-premium", self.base_url));
        let response = self.with_auth(request).send()?;

        let body: PremiumResponse = Self::expect_success(response)?.json()?;
        Ok(body.user)
    }

    /// Relay an exported poster (as a data URL) and get back the hosted URL.
    pub fn upload_poster(&self, image_data: &str, filename: &str) -> Result<String, ApiError> {
        let request = self
            .http
            .post(format!("{}/upload-to-imgbb", self.base_url))
            .json(&serde_json::json!({
                "imageData": image_data,
                "filename": filename,
            }));
        let response = self.with_auth(request).send()?;

        let body: UploadResponse = Self::expect_success(response)?.json()?;
        Ok(body.url)
    }

    pub fn posters(&self) -> Result<Vec<String>, ApiError> {
        let request = self.http.get(format!("{}/get-posters", self.base_url));
        let response = self.with_auth(request).send()?;

        let body: PostersResponse = Self::expect_success(response)?.json()?;
        Ok(body.posters)
    }

    /// Download thumbnail bytes from an absolute URL (no auth header; this
    /// goes to the image CDN, not our API).
    pub fn fetch_thumbnail(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = Self::expect_success(self.http.get(url).send()?)?;
        Ok(response.bytes()?.to_vec())
    }
}
