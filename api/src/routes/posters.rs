//! Poster upload relay, premium upgrade, and the gallery listing

use axum::{Json, Router, extract::State, routing::{get, post}};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::domain::users;
use crate::services::error::{ApiError, LogErr};
use crate::services::imgbb::ImgbbError;

use super::auth::Caller;
use super::user::UserProjection;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload-to-imgbb", post(upload_to_imgbb))
        .route("/update-to-premium", post(update_to_premium))
        .route("/get-posters", get(get_posters))
}

// ============================================================================
// Upload relay
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest {
    #[serde(default)]
    image_data: String,
    #[serde(default)]
    filename: String,
}

#[derive(Serialize)]
struct UploadResponse {
    message: &'static str,
    url: String,
}

/// POST /upload-to-imgbb - Forward an exported poster to the image host and
/// record the hosted URL on the caller's account
async fn upload_to_imgbb(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, ApiError> {
    if req.image_data.is_empty() || req.filename.is_empty() {
        return Err(ApiError::BadRequest(
            "Image data and filename are required".to_string(),
        ));
    }

    // The payload is a self-describing data URL; imgbb wants the bare base64
    let base64_part = req
        .image_data
        .split_once(',')
        .map(|(_, data)| data)
        .ok_or_else(|| {
            ApiError::BadRequest("imageData must be a base64 data URL".to_string())
        })?;

    // Reject broken payloads here instead of bouncing them off the relay
    if STANDARD.decode(base64_part).is_err() {
        return Err(ApiError::BadRequest(
            "imageData is not valid base64".to_string(),
        ));
    }

    let url = state
        .imgbb
        .upload_base64(base64_part, &req.filename)
        .await
        .map_err(|e| match e {
            ImgbbError::MissingKey => {
                eprintln!("[posters] upload rejected: {}", e);
                ApiError::Internal
            }
            other => ApiError::UploadRelay(other.to_string()),
        })?;

    users::append_poster(&state.db, user.id, &url)
        .await
        .log_500("Append poster error")?;

    Ok(Json(UploadResponse {
        message: "Image uploaded and saved successfully",
        url,
    }))
}

// ============================================================================
// Premium upgrade and gallery
// ============================================================================

#[derive(Serialize)]
struct PremiumResponse {
    message: &'static str,
    user: UserProjection,
}

/// POST /update-to-premium - One-way Free -> Premium transition
async fn update_to_premium(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
) -> Result<Json<PremiumResponse>, ApiError> {
    // The WHERE clause flips the flag only if it was off, so a double
    // upgrade loses the race cleanly instead of charging twice
    let updated = users::set_premium(&state.db, user.id)
        .await
        .log_500("Set premium error")?;
    if !updated {
        return Err(ApiError::AlreadyPremium);
    }

    let mut projection = UserProjection::from(user);
    projection.is_premium = true;

    Ok(Json(PremiumResponse {
        message: "Premium upgrade successful!",
        user: projection,
    }))
}

#[derive(Debug, Serialize)]
struct PostersResponse {
    posters: Vec<String>,
}

/// GET /get-posters - Premium-only listing of the caller's uploads
async fn get_posters(Caller(user): Caller) -> Result<Json<PostersResponse>, ApiError> {
    if !user.is_premium {
        return Err(ApiError::AccessDenied);
    }

    Ok(Json(PostersResponse {
        posters: user.posters,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with_posters(is_premium: bool) -> users::User {
        users::User {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$argon2id$irrelevant".to_string(),
            is_premium,
            posters: vec!["https://i.ibb.co/abc/poster.png".to_string()],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_gallery_is_premium_only_and_leaks_nothing() {
        let err = get_posters(Caller(user_with_posters(false)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AccessDenied));
        // The refusal carries no poster data
        assert!(!err.to_string().contains("ibb.co"));
    }

    #[tokio::test]
    async fn test_gallery_lists_uploads_for_premium_callers() {
        let response = get_posters(Caller(user_with_posters(true))).await.unwrap();
        assert_eq!(response.0.posters, ["https://i.ibb.co/abc/poster.png"]);
    }
}
