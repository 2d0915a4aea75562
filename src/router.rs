use axum::http::{HeaderValue, Method, header};
use axum::{Json, Router, middleware, routing::get};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::logging::logging_middleware;
use crate::middleware::maintenance::maintenance_middleware;
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::modules::auth::router::init_auth_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the application router with the full middleware pipeline.
///
/// Later `.layer()` calls wrap earlier ones, so the request passes through
/// logging, then the rate limiter, then the security headers, then the
/// maintenance kill switch, then CORS, before reaching a route.
pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(init_auth_router(&state.jwt_config))
        .merge(init_users_router(state.clone()))
        .route("/health", get(health))
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn_with_state(
            state.clone(),
            maintenance_middleware,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn(logging_middleware))
}
