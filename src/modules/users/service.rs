use axum::http::StatusCode;
use anyhow::anyhow;

use crate::state::AppState;
use crate::utils::errors::AppError;

use crate::store::model::Credential;

use super::model::ProfileResponse;

pub struct UserService;

impl UserService {
    /// Loads a profile by username, decrypting PII fields for the response.
    pub async fn profile(state: &AppState, username: &str) -> Result<ProfileResponse, AppError> {
        let credential = state
            .store
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, anyhow!("User not found")))?;

        Ok(Self::to_profile(state, credential))
    }

    /// All user profiles, for administrative review.
    pub async fn list(state: &AppState) -> Result<Vec<ProfileResponse>, AppError> {
        let credentials = state.store.list_all().await?;

        Ok(credentials
            .into_iter()
            .map(|credential| Self::to_profile(state, credential))
            .collect())
    }

    fn to_profile(state: &AppState, credential: Credential) -> ProfileResponse {
        ProfileResponse {
            username: credential.username,
            first_name: state.encryptor.decrypt(&credential.first_name),
            last_name: state.encryptor.decrypt(&credential.last_name),
            address: credential
                .address
                .as_deref()
                .map(|address| state.encryptor.decrypt(address)),
            roles: credential.roles,
            last_login_at: credential.last_login_at,
        }
    }
}
