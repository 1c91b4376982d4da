use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use tera::{Context, Tera};

use crate::auth::middleware::AdminAccess;
use crate::error::AppError;
use crate::models::rsvp::{Attendance, DeleteRequest, DeleteResponse, RsvpView};
use crate::templates::ADMIN_DASHBOARD;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route("/api/admin/rsvps", get(list_all))
        .route("/api/excluir/{id}", post(delete_rsvp))
}

async fn load_views(state: &AppState) -> Result<Vec<RsvpView>, AppError> {
    let all = state.store.list_all().await?;
    Ok(all.into_iter().map(RsvpView::from).collect())
}

async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminAccess,
) -> Result<Html<String>, AppError> {
    let views = load_views(&state).await?;
    Ok(Html(render_dashboard(&state.templates, &views)?))
}

async fn list_all(
    State(state): State<AppState>,
    _admin: AdminAccess,
) -> Result<Json<Vec<RsvpView>>, AppError> {
    Ok(Json(load_views(&state).await?))
}

async fn delete_rsvp(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<DeleteResponse>, AppError> {
    // The token is checked before anything else about the request is trusted.
    let request: DeleteRequest = serde_json::from_slice(&body).unwrap_or_default();
    let authorized = request
        .token()
        .is_some_and(|t| state.admin_token.verify(t));
    if !authorized {
        return Err(AppError::Forbidden);
    }

    let id: i32 = raw_id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid RSVP id: {raw_id}")))?;

    state.store.delete(id).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: format!("RSVP {id} deleted"),
    }))
}

/// Renders the host's table of responses. The admin token is never written into the page.
fn render_dashboard(templates: &Tera, views: &[RsvpView]) -> Result<String, AppError> {
    let attending = views
        .iter()
        .filter(|v| v.attendance == Attendance::Yes)
        .count();

    let mut context = Context::new();
    context.insert("rsvps", views);
    context.insert("attending", &attending);
    context.insert("declined", &(views.len() - attending));

    templates
        .render(ADMIN_DASHBOARD, &context)
        .map_err(|e| AppError::Internal(format!("Failed to render dashboard: {e}")))
}
