//! Registration, login, and the bearer-token caller extractor

use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{StatusCode, request::Parts},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

use crate::AppState;
use crate::domain::users;
use crate::services::error::{ApiError, LogErr};
use crate::services::{password, session};

use super::user::UserProjection;

pub fn routes() -> Router<Arc<AppState>> {
    // Rate limit: slow down credential stuffing on the auth endpoints
    let rate_limit_config = GovernorConfigBuilder::default()
        .per_second(6)
        .burst_size(10)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("Failed to build rate limit config");

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config.into(),
    };

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .layer(rate_limit_layer)
}

// ============================================================================
// Caller extractor - validates the bearer token and loads the user row
// ============================================================================

/// Authenticated caller, resolved fresh from the database on every request.
/// Handlers that gate on the premium flag read the persisted value, never a
/// client-supplied copy.
pub struct Caller(pub users::User);

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized(
                "Unauthorized. A bearer token is required",
            ))?;

        let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized(
            "Invalid token format. Expected: Bearer <token>",
        ))?;

        let user_id = session::validate_token(token, &state.jwt_secret)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token"))?;

        // A valid token for a deleted row is a dead session
        let user = users::get_user_by_id(&state.db, user_id)
            .await
            .log_500("Get user by id error")?
            .ok_or(ApiError::UnknownUser)?;

        Ok(Caller(user))
    }
}

// ============================================================================
// Registration and login
// ============================================================================

#[derive(Deserialize)]
struct RegisterRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// POST /register - Create an account
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let name = req.name.trim();
    let email = req.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email and password are required".to_string(),
        ));
    }

    let existing = users::get_user_by_email(&state.db, &email)
        .await
        .log_500("Get user by email error")?;
    if existing.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let hash = password::hash_password(&req.password).log_500("Password hash error")?;
    users::create_user(&state.db, name, &email, &hash)
        .await
        .log_500("Create user error")?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully",
        }),
    ))
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
    user: UserProjection,
}

/// POST /login - Exchange credentials for a bearer token
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = req.email.trim().to_lowercase();

    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let user = users::get_user_by_email(&state.db, &email)
        .await
        .log_500("Get user by email error")?
        .ok_or(ApiError::Unauthorized("Invalid credentials"))?;

    let matches = password::verify_password(&req.password, &user.password_hash)
        .log_500("Password verify error")?;
    if !matches {
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = session::create_token(user.id, &state.jwt_secret).log_500("Create token error")?;

    Ok(Json(LoginResponse {
        token,
        user: UserProjection::from(user),
    }))
}
