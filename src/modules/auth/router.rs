use axum::{Router, routing::post};

use crate::config::jwt::JwtConfig;
use crate::state::AppState;

use super::controller::{login, refresh_token};

/// Auth endpoints are registered at the configured paths rather than a fixed
/// nest, so deployments can relocate them without code changes.
pub fn init_auth_router(config: &JwtConfig) -> Router<AppState> {
    Router::new()
        .route(&config.login_path, post(login))
        .route(&config.refresh_path, post(refresh_token))
}
