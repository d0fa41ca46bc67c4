//! Error handling for route handlers
//!
//! Every failure a handler can surface is a variant here, so the whole API
//! responds with a uniform `{ "error": "<message>" }` body and the status
//! code the failure calls for.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::video::VideoInfoError;

#[derive(Debug)]
pub enum ApiError {
    /// Request body is missing fields or otherwise malformed.
    BadRequest(String),
    /// Missing, malformed, invalid, or expired bearer token.
    Unauthorized(&'static str),
    /// Token was valid but the user row no longer exists.
    UnknownUser,
    /// Non-premium caller hit a premium-only endpoint.
    AccessDenied,
    /// Email already registered.
    DuplicateEmail,
    /// Upgrade requested by a user who is already premium.
    AlreadyPremium,
    /// The supplied string could not be resolved to a video id.
    InvalidVideoUrl,
    /// Neither thumbnail tier produced an image.
    ThumbnailUnavailable,
    /// Thumbnail bytes could not be decoded, or yielded fewer than the
    /// minimum number of palette colors.
    Palette(String),
    /// The image host rejected or failed the relay upload.
    UploadRelay(String),
    /// Anything unexpected. Details are logged server-side, never returned.
    Internal,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "{}", msg),
            ApiError::Unauthorized(msg) => write!(f, "{}", msg),
            ApiError::UnknownUser => write!(f, "User not found"),
            ApiError::AccessDenied => {
                write!(f, "Access denied. This feature is for premium users only")
            }
            ApiError::DuplicateEmail => write!(f, "Email is already registered"),
            ApiError::AlreadyPremium => write!(f, "User is already premium"),
            ApiError::InvalidVideoUrl => write!(f, "The YouTube URL is not valid"),
            ApiError::ThumbnailUnavailable => {
                write!(f, "No thumbnail was found for this video")
            }
            ApiError::Palette(msg) => write!(f, "Could not process the thumbnail: {}", msg),
            ApiError::UploadRelay(msg) => write!(f, "Image upload failed: {}", msg),
            ApiError::Internal => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::UnknownUser => StatusCode::NOT_FOUND,
            ApiError::AccessDenied => StatusCode::FORBIDDEN,
            ApiError::DuplicateEmail => StatusCode::CONFLICT,
            ApiError::AlreadyPremium => StatusCode::BAD_REQUEST,
            ApiError::InvalidVideoUrl => StatusCode::BAD_REQUEST,
            ApiError::ThumbnailUnavailable => StatusCode::BAD_GATEWAY,
            ApiError::Palette(_) => StatusCode::BAD_GATEWAY,
            ApiError::UploadRelay(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<VideoInfoError> for ApiError {
    fn from(e: VideoInfoError) -> Self {
        match e {
            VideoInfoError::InvalidUrl => ApiError::InvalidVideoUrl,
            VideoInfoError::ThumbnailUnavailable => ApiError::ThumbnailUnavailable,
            VideoInfoError::Decode(msg) => ApiError::Palette(msg),
            VideoInfoError::InsufficientPalette(n) => {
                ApiError::Palette(format!("only {} colors could be sampled", n))
            }
        }
    }
}

/// Extension trait for logging errors and converting to ApiError
pub trait LogErr<T> {
    /// Log error with context and return `ApiError::Internal`
    fn log_500(self, context: &str) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_500(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| {
            eprintln!("{}: {}", context, e);
            ApiError::Internal
        })
    }
}
