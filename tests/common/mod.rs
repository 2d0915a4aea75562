#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use campusgate::config::cors::CorsConfig;
use campusgate::config::jwt::JwtConfig;
use campusgate::config::rate_limit::RateLimitConfig;
use campusgate::config::security::SecurityConfig;
use campusgate::modules::auth::model::Role;
use campusgate::router::init_router;
use campusgate::state::AppState;
use campusgate::store::{Credential, MemoryCredentialStore};
use campusgate::utils::password::hash_password;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

// base64("campusgate-test-secret")
pub const TEST_SECRET: &str = "Y2FtcHVzZ2F0ZS10ZXN0LXNlY3JldA==";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        issuer: "campusgate".to_string(),
        audience: "campusgate-api".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604800,
        not_before_grace: 30,
        header_name: "authorization".to_string(),
        token_prefix: "Bearer ".to_string(),
        login_path: "/api/auth/login".to_string(),
        refresh_path: "/api/auth/refresh".to_string(),
    }
}

pub fn test_security_config() -> SecurityConfig {
    SecurityConfig {
        fingerprinting_enabled: true,
        encryption_key: "test-encryption-key".to_string(),
    }
}

pub fn test_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        window_secs: 60,
        max_requests: 100,
        exempt_prefixes: vec!["/api/auth".to_string()],
    }
}

pub fn test_cors_config() -> CorsConfig {
    CorsConfig {
        allowed_origins: vec!["http://localhost:3000".to_string()],
    }
}

pub fn build_state(store: &MemoryCredentialStore) -> AppState {
    build_state_with(
        store,
        test_jwt_config(),
        test_security_config(),
        test_rate_limit_config(),
    )
}

pub fn build_state_with(
    store: &MemoryCredentialStore,
    jwt_config: JwtConfig,
    security_config: SecurityConfig,
    rate_limit_config: RateLimitConfig,
) -> AppState {
    AppState::new(
        Arc::new(store.clone()),
        jwt_config,
        security_config,
        rate_limit_config,
        test_cors_config(),
    )
    .unwrap()
}

pub fn setup_app(state: AppState) -> Router {
    init_router(state)
}

/// Inserts a credential with encrypted PII and a bcrypt-hashed password.
pub fn create_test_user(
    state: &AppState,
    store: &MemoryCredentialStore,
    username: &str,
    password: &str,
    roles: Vec<Role>,
) -> Credential {
    let credential = Credential {
        id: Uuid::new_v4(),
        username: username.to_string(),
        password: hash_password(password).unwrap(),
        roles,
        device_fingerprint: None,
        last_login_at: None,
        failed_attempts: 0,
        locked_until: None,
        first_name: state.encryptor.encrypt("Test"),
        last_name: state.encryptor.encrypt("User"),
        address: Some(state.encryptor.encrypt("1 Test Street")),
    };
    store.insert(credential.clone());
    credential
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

/// Request builder pre-populated with the headers a browser-like client
/// would send, so a stable fingerprint can be derived.
pub fn device_request(method: &str, uri: &str, ip: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("user-agent", "Mozilla/5.0 (X11; Linux x86_64)")
        .header("accept-language", "en-US")
        .header("accept-encoding", "gzip")
        .header("x-forwarded-for", ip)
}

pub async fn read_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Logs in from the given IP and returns the token pair response body.
pub async fn login(app: &Router, username: &str, password: &str, ip: &str) -> Value {
    let request = device_request("POST", "/api/auth/login", ip)
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "username": username,
                "password": password
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    read_json(response).await
}
