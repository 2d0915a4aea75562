mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use campusgate::modules::auth::model::Role;
use campusgate::store::MemoryCredentialStore;
use common::{
    build_state, create_test_user, device_request, generate_unique_email, login, read_json,
    setup_app,
};
use serde_json::json;
use tower::ServiceExt;

const CLIENT_IP: &str = "203.0.113.7";

#[tokio::test]
async fn test_login_success() {
    let store = MemoryCredentialStore::new();
    let state = build_state(&store);
    let email = generate_unique_email();
    create_test_user(&state, &store, &email, "testpass123", vec![Role::Student]);
    let app = setup_app(state);

    let body = login(&app, &email, "testpass123", CLIENT_IP).await;

    assert!(body["accessToken"].is_string());
    assert!(body["refreshToken"].is_string());
    assert_ne!(body["accessToken"], body["refreshToken"]);
}

#[tokio::test]
async fn test_login_records_fingerprint_and_last_login() {
    let store = MemoryCredentialStore::new();
    let state = build_state(&store);
    let email = generate_unique_email();
    create_test_user(&state, &store, &email, "testpass123", vec![Role::Student]);
    let app = setup_app(state);

    login(&app, &email, "testpass123", CLIENT_IP).await;

    let stored = store.get(&email).unwrap();
    assert!(stored.device_fingerprint.is_some());
    assert!(stored.last_login_at.is_some());
    assert_eq!(stored.failed_attempts, 0);
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_user_are_indistinguishable() {
    let store = MemoryCredentialStore::new();
    let state = build_state(&store);
    let email = generate_unique_email();
    create_test_user(&state, &store, &email, "testpass123", vec![Role::Student]);
    let app = setup_app(state);

    let mut bodies = Vec::new();
    for (username, password) in [
        (email.as_str(), "wrongpass"),
        ("nonexistent@test.com", "testpass123"),
    ] {
        let request = device_request("POST", "/api/auth/login", CLIENT_IP)
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
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        bodies.push(read_json(response).await);
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0]["message"], "Invalid username or password");
}

#[tokio::test]
async fn test_login_invalid_email_format() {
    let store = MemoryCredentialStore::new();
    let app = setup_app(build_state(&store));

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "username": "not-an-email",
                "password": "password123"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_missing_password() {
    let store = MemoryCredentialStore::new();
    let app = setup_app(build_state(&store));

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "username": "test@test.com"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_with_body_token() {
    let store = MemoryCredentialStore::new();
    let state = build_state(&store);
    let email = generate_unique_email();
    create_test_user(&state, &store, &email, "testpass123", vec![Role::Teacher]);
    let app = setup_app(state);

    let pair = login(&app, &email, "testpass123", CLIENT_IP).await;
    let refresh_token = pair["refreshToken"].as_str().unwrap();

    let request = device_request("POST", "/api/auth/refresh", CLIENT_IP)
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({ "refreshToken": refresh_token })).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert!(body["accessToken"].is_string());
    assert_ne!(body["refreshToken"], pair["refreshToken"]);
}

#[tokio::test]
async fn test_refresh_with_bearer_token() {
    let store = MemoryCredentialStore::new();
    let state = build_state(&store);
    let email = generate_unique_email();
    create_test_user(&state, &store, &email, "testpass123", vec![Role::Teacher]);
    let app = setup_app(state);

    let pair = login(&app, &email, "testpass123", CLIENT_IP).await;
    let refresh_token = pair["refreshToken"].as_str().unwrap();

    let request = device_request("POST", "/api/auth/refresh", CLIENT_IP)
        .header("authorization", format!("Bearer {refresh_token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert!(body["accessToken"].is_string());
    assert!(body["refreshToken"].is_string());
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let store = MemoryCredentialStore::new();
    let state = build_state(&store);
    let email = generate_unique_email();
    create_test_user(&state, &store, &email, "testpass123", vec![Role::Teacher]);
    let app = setup_app(state);

    let pair = login(&app, &email, "testpass123", CLIENT_IP).await;
    let access_token = pair["accessToken"].as_str().unwrap();

    let request = device_request("POST", "/api/auth/refresh", CLIENT_IP)
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({ "refreshToken": access_token })).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Invalid token type for this operation");
}

#[tokio::test]
async fn test_refresh_missing_token() {
    let store = MemoryCredentialStore::new();
    let app = setup_app(build_state(&store));

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_garbage_token() {
    let store = MemoryCredentialStore::new();
    let app = setup_app(build_state(&store));

    let request = device_request("POST", "/api/auth/refresh", CLIENT_IP)
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({ "refreshToken": "not-a-token" })).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = read_json(response).await;
    assert_eq!(body["code"], "401");
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_me_returns_decrypted_profile() {
    let store = MemoryCredentialStore::new();
    let state = build_state(&store);
    let email = generate_unique_email();
    create_test_user(&state, &store, &email, "testpass123", vec![Role::Teacher]);
    let app = setup_app(state);

    let pair = login(&app, &email, "testpass123", CLIENT_IP).await;
    let access_token = pair["accessToken"].as_str().unwrap();

    let request = device_request("GET", "/api/users/me", CLIENT_IP)
        .header("authorization", format!("Bearer {access_token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["username"], email);
    assert_eq!(body["firstName"], "Test");
    assert_eq!(body["lastName"], "User");
    assert_eq!(body["address"], "1 Test Street");
    assert_eq!(body["roles"], json!(["teacher"]));
    assert!(body["lastLoginAt"].is_string());
}

#[tokio::test]
async fn test_me_rejects_refresh_token() {
    let store = MemoryCredentialStore::new();
    let state = build_state(&store);
    let email = generate_unique_email();
    create_test_user(&state, &store, &email, "testpass123", vec![Role::Teacher]);
    let app = setup_app(state);

    let pair = login(&app, &email, "testpass123", CLIENT_IP).await;
    let refresh_token = pair["refreshToken"].as_str().unwrap();

    let request = device_request("GET", "/api/users/me", CLIENT_IP)
        .header("authorization", format!("Bearer {refresh_token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Invalid token type for this operation");
}

#[tokio::test]
async fn test_me_without_token() {
    let store = MemoryCredentialStore::new();
    let app = setup_app(build_state(&store));

    let request = Request::builder()
        .method("GET")
        .uri("/api/users/me")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_expired_token() {
    let store = MemoryCredentialStore::new();
    let mut jwt_config = common::test_jwt_config();
    jwt_config.access_token_expiry = -3600;
    let state = common::build_state_with(
        &store,
        jwt_config,
        common::test_security_config(),
        common::test_rate_limit_config(),
    );
    let email = generate_unique_email();
    create_test_user(&state, &store, &email, "testpass123", vec![Role::Teacher]);
    let app = setup_app(state);

    let pair = login(&app, &email, "testpass123", CLIENT_IP).await;
    let access_token = pair["accessToken"].as_str().unwrap();

    let request = device_request("GET", "/api/users/me", CLIENT_IP)
        .header("authorization", format!("Bearer {access_token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = read_json(response).await;
    assert_eq!(body["code"], "401");
    assert_eq!(body["message"], "Invalid or expired token");
}
