pub mod admin;
pub mod rsvp;

use std::path::Path;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::services::{ServeDir, ServeFile};

use crate::error::AppError;
use crate::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .merge(rsvp::router())
        .merge(admin::router())
}

/// The invitation page at `/` and its assets under `/static`. Anything else is a 404.
pub fn pages_router(static_dir: &Path) -> Router<AppState> {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
}

async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    state.store.ping().await?;
    Ok(Json(serde_json::json!({ "status": "ok", "db": true })))
}
