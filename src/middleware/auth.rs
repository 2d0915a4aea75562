//! Bearer-token authentication extractor.
//!
//! [`AuthUser`] validates the `Authorization` header on protected routes:
//! it decodes the token, refuses refresh tokens presented as access tokens,
//! and enforces device-fingerprint binding when enabled. Routes without the
//! extractor stay public; an absent header never blocks them.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use tracing::{debug, warn};

use crate::modules::auth::model::{Claims, Role, TokenType};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::fingerprint;

/// The authenticated principal with its granted authorities, extracted from
/// a verified access token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn username(&self) -> &str {
        &self.0.sub
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.0.roles.contains(&role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }
}

/// Client-identifying request metadata, captured before any token work.
///
/// `fingerprint` is `None` when the request carries too little metadata to
/// identify the client; callers skip fingerprint enforcement in that case.
#[derive(Debug, Clone)]
pub struct ClientMeta {
    pub fingerprint: Option<String>,
}

impl ClientMeta {
    pub fn from_parts(headers: &HeaderMap, extensions: &axum::http::Extensions) -> Self {
        let ip = fingerprint::client_ip(headers, extensions).map(|ip| ip.to_string());
        Self {
            fingerprint: fingerprint::generate(headers, ip.as_deref()),
        }
    }
}

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientMeta::from_parts(&parts.headers, &parts.extensions))
    }
}

/// Pulls the raw token out of the configured header, if present.
pub fn bearer_token<'a>(headers: &'a HeaderMap, state: &AppState) -> Option<&'a str> {
    headers
        .get(state.jwt_config.header_name.as_str())
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(state.jwt_config.token_prefix.as_str()))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers, state)
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let claims = state.codec.decode(token).map_err(|kind| {
            debug!(error = %kind, "Token rejected");
            AppError::unauthorized("Invalid or expired token")
        })?;

        if claims.token_type != TokenType::Access {
            warn!(sub = %claims.sub, "Refresh token presented for resource access");
            return Err(AppError::unauthorized(
                "Invalid token type for this operation",
            ));
        }

        if state.security_config.fingerprinting_enabled {
            let meta = ClientMeta::from_parts(&parts.headers, &parts.extensions);
            if let (Some(expected), Some(current)) =
                (claims.fpt.as_deref(), meta.fingerprint.as_deref())
            {
                if expected != current {
                    warn!(sub = %claims.sub, "Device fingerprint mismatch");
                    return Err(AppError::unauthorized("Invalid or expired token"));
                }
            }
        }

        Ok(AuthUser(claims))
    }
}
