//! Token codec: issuance and verification of signed access/refresh tokens.
//!
//! Tokens are compact JWTs (HMAC-SHA256) carrying the claim set in
//! [`Claims`]. The codec is constructed once from [`JwtConfig`]; the signing
//! and verification keys are derived a single time from the base64-encoded
//! secret. Verification checks signature, expiration, not-before, issuer and
//! audience, and maps every failure to a [`TokenError`] kind instead of
//! leaking parser errors to callers.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::{Claims, Role, TokenType};
use crate::utils::errors::AppError;

/// Internal classification of token verification failures.
///
/// Clients always see a uniform 401; the kind is logged server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Expiration has passed
    Expired,
    /// Not-before is in the future
    Immature,
    /// Structurally invalid token
    Malformed,
    /// Signature does not verify under the configured key
    BadSignature,
    /// Algorithm or token format not supported
    Unsupported,
    /// Anything else (wrong issuer/audience, missing claims, ...)
    Other,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            TokenError::Expired => "expired",
            TokenError::Immature => "immature",
            TokenError::Malformed => "malformed",
            TokenError::BadSignature => "bad_signature",
            TokenError::Unsupported => "unsupported",
            TokenError::Other => "other",
        };
        write!(f, "{kind}")
    }
}

/// Signs and verifies access/refresh tokens with keys derived once at
/// construction time.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl TokenCodec {
    pub fn new(config: JwtConfig) -> Result<Self, AppError> {
        let encoding = EncodingKey::from_base64_secret(&config.secret)
            .map_err(|e| AppError::internal_error(format!("Invalid JWT secret: {}", e)))?;
        let decoding = DecodingKey::from_base64_secret(&config.secret)
            .map_err(|e| AppError::internal_error(format!("Invalid JWT secret: {}", e)))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_nbf = true;
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);

        Ok(Self {
            encoding,
            decoding,
            validation,
            config,
        })
    }

    /// Issues a short-lived access token carrying the principal's roles.
    pub fn issue_access_token(
        &self,
        username: &str,
        roles: Vec<Role>,
        fingerprint: Option<&str>,
    ) -> Result<String, AppError> {
        self.issue(
            username,
            roles,
            TokenType::Access,
            self.config.access_token_expiry,
            fingerprint,
        )
    }

    /// Issues a long-lived refresh token. Refresh tokens carry no roles;
    /// authorities are re-resolved from the store when the pair is renewed.
    pub fn issue_refresh_token(
        &self,
        username: &str,
        fingerprint: Option<&str>,
    ) -> Result<String, AppError> {
        self.issue(
            username,
            Vec::new(),
            TokenType::Refresh,
            self.config.refresh_token_expiry,
            fingerprint,
        )
    }

    fn issue(
        &self,
        username: &str,
        roles: Vec<Role>,
        token_type: TokenType,
        ttl_seconds: i64,
        fingerprint: Option<&str>,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let iat = now.timestamp();
        // Backdated not-before absorbs clock skew between issuer and verifier.
        let nbf = (now - Duration::seconds(self.config.not_before_grace)).timestamp();
        let exp = (now + Duration::seconds(ttl_seconds)).timestamp();

        let fpt = fingerprint
            .filter(|fp| !fp.is_empty())
            .map(|fp| fp.to_string());

        let claims = Claims {
            sub: username.to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
            iat,
            nbf,
            exp,
            token_type,
            authorities: roles.clone(),
            roles,
            fpt,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
    }

    /// Verifies signature and time-window validity, returning the claims.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::ImmatureSignature => TokenError::Immature,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::Unsupported
                }
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => TokenError::Malformed,
                _ => TokenError::Other,
            })
    }
}
