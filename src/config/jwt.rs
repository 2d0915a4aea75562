use std::env;

/// Token issuance and verification settings, loaded from the environment.
///
/// `secret` is the base64-encoded HMAC-SHA256 signing secret; the codec
/// derives its keys from it once at startup.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// Access token lifetime in seconds
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,
    /// Seconds the not-before claim is backdated to absorb clock skew
    pub not_before_grace: i64,
    /// Header carrying the bearer token
    pub header_name: String,
    /// Scheme prefix in front of the token, including the trailing space
    pub token_prefix: String,
    pub login_path: String,
    pub refresh_path: String,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                // base64("campusgate-dev-secret-change-in-production")
                "Y2FtcHVzZ2F0ZS1kZXYtc2VjcmV0LWNoYW5nZS1pbi1wcm9kdWN0aW9u".to_string()
            }),
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "campusgate".to_string()),
            audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "campusgate-api".to_string()),
            access_token_expiry: env::var("JWT_ACCESS_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600), // 1 hour
            refresh_token_expiry: env::var("JWT_REFRESH_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(604800), // 7 days
            not_before_grace: env::var("JWT_NOT_BEFORE_GRACE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            header_name: env::var("AUTH_HEADER_NAME")
                .unwrap_or_else(|_| "authorization".to_string()),
            token_prefix: env::var("AUTH_TOKEN_PREFIX").unwrap_or_else(|_| "Bearer ".to_string()),
            login_path: env::var("AUTH_LOGIN_PATH")
                .unwrap_or_else(|_| "/api/auth/login".to_string()),
            refresh_path: env::var("AUTH_REFRESH_PATH")
                .unwrap_or_else(|_| "/api/auth/refresh".to_string()),
        }
    }
}
