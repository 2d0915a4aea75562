use axum::Json;
use axum::extract::State;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::model::ProfileResponse;
use super::service::UserService;

/// The authenticated user's own profile.
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = UserService::profile(&state, user.username()).await?;
    Ok(Json(profile))
}

/// All user profiles. Admin only; the role guard runs before this handler.
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    let profiles = UserService::list(&state).await?;
    Ok(Json(profiles))
}
