//! Role-based authorization middleware.
//!
//! Layered on top of [`AuthUser`]: the bearer token must verify first, then
//! the principal's role claims are checked against the allowed set. Failing
//! the role check is a 403, distinct from the 401s of token verification.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::model::Role;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &[Role],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    check_any_role(&auth_user, allowed_roles)?;

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Admin-level access: system admins and school admins.
pub async fn require_admin(
    state: State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_roles(state, req, next, &[Role::SystemAdmin, Role::Admin]).await
}

/// Role check usable from controller logic as well as middleware.
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[Role]) -> Result<(), AppError> {
    if !auth_user.has_any_role(allowed_roles) {
        let allowed = allowed_roles
            .iter()
            .map(|role| role.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        warn!(
            username = %auth_user.username(),
            allowed = %allowed,
            "Insufficient role for this resource"
        );
        return Err(AppError::forbidden("Insufficient permissions"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::model::{Claims, TokenType};

    fn user_with_roles(roles: Vec<Role>) -> AuthUser {
        AuthUser(Claims {
            sub: "admin@school.edu".to_string(),
            iss: "campusgate".to_string(),
            aud: "campusgate-api".to_string(),
            jti: "test-jti".to_string(),
            iat: 1_700_000_000,
            nbf: 1_699_999_970,
            exp: 1_700_003_600,
            token_type: TokenType::Access,
            authorities: roles.clone(),
            roles,
            fpt: None,
        })
    }

    #[test]
    fn test_check_any_role_allows_matching_role() {
        let user = user_with_roles(vec![Role::Admin]);
        assert!(check_any_role(&user, &[Role::SystemAdmin, Role::Admin]).is_ok());
    }

    #[test]
    fn test_check_any_role_rejects_missing_role() {
        let user = user_with_roles(vec![Role::Student]);
        let err = check_any_role(&user, &[Role::SystemAdmin, Role::Admin]).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_check_any_role_rejects_empty_roles() {
        let user = user_with_roles(vec![]);
        assert!(check_any_role(&user, &[Role::Admin]).is_err());
    }
}
