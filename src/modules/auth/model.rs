use serde::{Deserialize, Serialize};
use validator::Validate;

/// Roles a principal can carry, as embedded in token claims.
///
/// Kept as a closed enumeration with explicit claim (de)serialization so a
/// token can never smuggle an unknown authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SystemAdmin,
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SystemAdmin => "system_admin",
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "system_admin" => Some(Role::SystemAdmin),
            "admin" => Some(Role::Admin),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

/// Token type claim distinguishing access from refresh tokens. The two are
/// never interchangeable: resource access requires `access`, minting new
/// pairs requires `refresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claim set shared by access and refresh tokens.
///
/// `sub` carries the username. Roles are duplicated under `roles` and
/// `authorities` for compatibility with older clients. `fpt` is the optional
/// device-fingerprint binding and is only present when fingerprinting was
/// enabled and a fingerprint could be computed at issue time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username (subject claim)
    pub sub: String,
    /// Token issuer
    pub iss: String,
    /// Intended audience
    pub aud: String,
    /// Unique token id, for auditing
    pub jti: String,
    /// Issued-at (Unix timestamp)
    pub iat: i64,
    /// Not-before (Unix timestamp, `iat` minus the configured grace)
    pub nbf: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Access or refresh
    pub token_type: TokenType,
    /// Granted roles
    pub roles: Vec<Role>,
    /// Duplicate of `roles` under the legacy claim name
    pub authorities: Vec<Role>,
    /// Device fingerprint the token is bound to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fpt: Option<String>,
}

// Login request structure
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "username must be a valid email address"))]
    pub username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Freshly issued access/refresh token pair.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh request body. The token may instead arrive in the
/// `Authorization` bearer header, in which case the body is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}
