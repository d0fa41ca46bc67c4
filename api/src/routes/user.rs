//! Current-user endpoint and the shared user projection

use axum::{Json, Router, routing::get};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;
use crate::domain::users;

use super::auth::Caller;

/// User API response DTO
/// password_hash and the poster list intentionally omitted - the list has
/// its own premium-gated endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProjection {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub is_premium: bool,
}

impl From<users::User> for UserProjection {
    fn from(u: users::User) -> Self {
        Self {
            user_id: u.id,
            name: u.name,
            email: u.email,
            is_premium: u.is_premium,
        }
    }
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/me", get(get_me))
}

/// GET /me - Current user projection. Clients gate premium features on this
/// persisted flag rather than whatever they cached at login.
async fn get_me(Caller(user): Caller) -> Json<UserProjection> {
    Json(UserProjection::from(user))
}
