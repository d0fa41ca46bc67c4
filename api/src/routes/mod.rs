pub mod auth;
pub mod posters;
pub mod user;
pub mod video;

use axum::Router;
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(posters::routes())
        .merge(user::routes())
        .merge(video::routes())
}
