use axum::{Router, middleware, routing::get};

use crate::middleware::role::require_admin;
use crate::state::AppState;

use super::controller::{get_me, list_users};

/// The list route is admin-guarded; `/me` only requires a valid access
/// token. `route_layer` applies to the routes registered before it, so the
/// guard does not cover `/me`.
pub fn init_users_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users/", get(list_users))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
        .route("/api/users/me", get(get_me))
}
