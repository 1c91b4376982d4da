use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct TokenParams {
    token: Option<String>,
}

/// Proof that the request carried the admin token in its `?token=` query.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Unparseable query strings are treated the same as a missing token.
        let token = Query::<TokenParams>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|Query(params)| params.token)
            .ok_or(AppError::Forbidden)?;

        if !state.admin_token.verify(&token) {
            return Err(AppError::Forbidden);
        }

        Ok(AdminAccess)
    }
}
