//! The poster-data endpoint

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::services::error::ApiError;

use super::auth::Caller;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/get-video-info", post(get_video_info))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoInfoRequest {
    #[serde(default)]
    youtube_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoInfoResponse {
    title: String,
    thumbnail_url: String,
    colors: Vec<String>,
}

/// POST /get-video-info - Run the pipeline for one pasted URL
async fn get_video_info(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Json(req): Json<VideoInfoRequest>,
) -> Result<Json<VideoInfoResponse>, ApiError> {
    if req.youtube_url.trim().is_empty() {
        return Err(ApiError::BadRequest("A YouTube URL is required".to_string()));
    }

    let info = state.video.fetch(&req.youtube_url).await.map_err(|e| {
        eprintln!("[video] pipeline error for {:?}: {}", req.youtube_url, e);
        ApiError::from(e)
    })?;

    Ok(Json(VideoInfoResponse {
        title: info.title,
        thumbnail_url: info.thumbnail_url,
        colors: info.colors,
    }))
}
