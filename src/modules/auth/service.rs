use chrono::Utc;
use tracing::{info, warn};

use crate::state::AppState;
use crate::store::model::Credential;
use crate::utils::errors::AppError;
use crate::utils::jwt::TokenError;
use crate::utils::password::verify_password;

use super::model::{LoginRequest, TokenPairResponse, TokenType};

pub struct AuthService;

impl AuthService {
    /// Authenticates a credential pair and issues a fresh token pair bound
    /// to the caller's device fingerprint.
    ///
    /// Every failure path returns the same generic 401 so the response never
    /// reveals whether the username exists, the password was wrong, or the
    /// account is locked.
    pub async fn login(
        state: &AppState,
        dto: LoginRequest,
        fingerprint: Option<String>,
    ) -> Result<TokenPairResponse, AppError> {
        let credential = state
            .store
            .find_by_username(&dto.username)
            .await?
            .ok_or_else(|| {
                warn!(username = %dto.username, "Login attempt for unknown user");
                invalid_credentials()
            })?;

        if Self::is_locked(&credential) {
            warn!(username = %dto.username, "Login attempt on locked account");
            return Err(invalid_credentials());
        }

        if !verify_password(&dto.password, &credential.password)? {
            warn!(username = %dto.username, "Password verification failed");
            return Err(invalid_credentials());
        }

        let pair = Self::issue_pair(state, &credential.username, &credential, fingerprint.as_deref())?;

        state
            .store
            .record_login(credential.id, fingerprint.as_deref(), Utc::now())
            .await?;

        info!(username = %credential.username, "Login successful");
        Ok(pair)
    }

    /// Exchanges a valid refresh token for a new token pair.
    ///
    /// Roles are re-resolved from the store rather than trusted from the
    /// presented token, and the new pair is bound to the device currently
    /// making the request.
    pub async fn refresh(
        state: &AppState,
        token: &str,
        fingerprint: Option<String>,
    ) -> Result<TokenPairResponse, AppError> {
        let claims = state.codec.decode(token).map_err(|kind| {
            if kind == TokenError::Expired {
                info!("Refresh token expired");
            } else {
                warn!(error = %kind, "Refresh token rejected");
            }
            AppError::unauthorized("Invalid or expired token")
        })?;

        if claims.token_type != TokenType::Refresh {
            warn!(sub = %claims.sub, "Access token presented to the refresh endpoint");
            return Err(AppError::unauthorized(
                "Invalid token type for this operation",
            ));
        }

        if state.security_config.fingerprinting_enabled {
            if let (Some(expected), Some(current)) =
                (claims.fpt.as_deref(), fingerprint.as_deref())
            {
                if expected != current {
                    warn!(sub = %claims.sub, "Refresh from unrecognized device");
                    return Err(AppError::unauthorized("Invalid or expired token"));
                }
            }
        }

        let credential = state
            .store
            .find_by_username(&claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(sub = %claims.sub, "Refresh token subject no longer exists");
                AppError::unauthorized("Invalid or expired token")
            })?;

        if Self::is_locked(&credential) {
            warn!(sub = %claims.sub, "Refresh attempt on locked account");
            return Err(AppError::unauthorized("Invalid or expired token"));
        }

        let pair = Self::issue_pair(state, &claims.sub, &credential, fingerprint.as_deref())?;

        info!(username = %claims.sub, "Token pair refreshed");
        Ok(pair)
    }

    fn issue_pair(
        state: &AppState,
        username: &str,
        credential: &Credential,
        fingerprint: Option<&str>,
    ) -> Result<TokenPairResponse, AppError> {
        let fingerprint = if state.security_config.fingerprinting_enabled {
            fingerprint
        } else {
            None
        };

        Ok(TokenPairResponse {
            access_token: state.codec.issue_access_token(
                username,
                credential.roles.clone(),
                fingerprint,
            )?,
            refresh_token: state.codec.issue_refresh_token(username, fingerprint)?,
        })
    }

    fn is_locked(credential: &Credential) -> bool {
        credential
            .locked_until
            .is_some_and(|until| until > Utc::now())
    }
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid username or password")
}
