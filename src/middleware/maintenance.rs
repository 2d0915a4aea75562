//! Emergency kill switch.
//!
//! Flipping [`AppState::set_auth_required`] to false puts the API into
//! lockdown: every request is answered with a fixed maintenance response
//! before any credential or token work happens.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::state::AppState;

pub async fn maintenance_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if !state.auth_required() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "code": "503",
                "message": "Service temporarily unavailable",
            })),
        )
            .into_response();
    }

    next.run(req).await
}
