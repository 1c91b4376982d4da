use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::AppError;
use crate::models::rsvp::{NewRsvp, SubmitRequest, SubmitResponse};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/confirmar", post(submit))
        .route("/api/confirmados", get(list_confirmed))
}

async fn submit(
    State(state): State<AppState>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let Json(body) = body?;
    let rsvp = NewRsvp::parse(&body.name, &body.attendance)?;

    let outcome = state.store.submit(&rsvp).await?;
    Ok(Json(outcome.into()))
}

async fn list_confirmed(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.store.list_confirmed().await?))
}
