use axum::Json;
use axum::extract::{Request, State};

use crate::middleware::auth::{ClientMeta, bearer_token};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{LoginRequest, RefreshRequest, TokenPairResponse};
use super::service::AuthService;

/// Login with username and password, receiving an access/refresh token pair.
pub async fn login(
    State(state): State<AppState>,
    meta: ClientMeta,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenPairResponse>, AppError> {
    let pair = AuthService::login(&state, dto, meta.fingerprint).await?;
    Ok(Json(pair))
}

/// Exchange a refresh token for a new pair.
///
/// The token is taken from the bearer header when present, otherwise from
/// the JSON body. Takes the raw request because the body is optional.
pub async fn refresh_token(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<TokenPairResponse>, AppError> {
    let (parts, body) = req.into_parts();
    let meta = ClientMeta::from_parts(&parts.headers, &parts.extensions);

    let token = match bearer_token(&parts.headers, &state) {
        Some(token) => token.to_string(),
        None => token_from_body(body).await?,
    };

    let pair = AuthService::refresh(&state, &token, meta.fingerprint).await?;
    Ok(Json(pair))
}

async fn token_from_body(body: axum::body::Body) -> Result<String, AppError> {
    const BODY_LIMIT: usize = 16 * 1024;

    let bytes = axum::body::to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;

    if bytes.is_empty() {
        return Err(AppError::bad_request("Missing refresh token"));
    }

    serde_json::from_slice::<RefreshRequest>(&bytes)
        .map_err(|_| AppError::bad_request("Invalid request body"))?
        .refresh_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing refresh token"))
}
