//! Integration tests for authentication endpoints

use async_trait::async_trait;
use authgate_api::{models::*, ApiServer, ApiServerConfig};
use authgate_auth::{
    Identity, InMemoryUserStore, NewIdentity, PasswordError, PasswordScheme, StoreError, UserStore,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

/// Cheap stand-in for Argon2 so the suite stays fast
struct PlainScheme;

impl PasswordScheme for PlainScheme {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(format!("plain:{}", password))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        hash.strip_prefix("plain:")
            .map(|stored| stored == password)
            .ok_or_else(|| PasswordError::InvalidHashFormat(hash.to_string()))
    }
}

/// Store whose every operation fails, as if the database were down
struct UnavailableStore;

#[async_trait]
impl UserStore for UnavailableStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<Identity>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<Identity>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn create(&self, _identity: NewIdentity) -> Result<Identity, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn update_status(
        &self,
        _id: &str,
        _status: &str,
    ) -> Result<Option<Identity>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

fn create_test_app(store: Arc<dyn UserStore>) -> Router {
    ApiServer::new(
        ApiServerConfig::new("test-secret"),
        store,
        Arc::new(PlainScheme),
    )
    .unwrap()
    .build_router()
}

fn test_app() -> Router {
    create_test_app(Arc::new(InMemoryUserStore::new()))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&value).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, bytes.to_vec())
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}

async fn signup(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = call(
        app,
        "PUT",
        "/api/auth/signup",
        None,
        Some(json!({ "email": email, "password": password, "name": "Test" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    parse::<SignupResponse>(&body).user_id
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Vec<u8>) {
    call(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

#[tokio::test]
async fn test_signup_login_and_status_full_flow() {
    let app = test_app();
    let user_id = signup(&app, "test@test.com", "tester").await;

    // 1. Login
    let (status, body) = login(&app, "test@test.com", "tester").await;
    assert_eq!(status, StatusCode::OK);
    let login_data: LoginResponse = parse(&body);
    assert_eq!(login_data.user_id, user_id);
    assert!(login_data.token.starts_with("eyJ"));

    // 2. Fresh users report the sentinel status, twice in a row
    for _ in 0..2 {
        let (status, body) = call(&app, "GET", "/api/auth/status", Some(login_data.token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<UserStatusResponse>(&body).status, "I am new!");
    }

    // 3. Update and read back
    let (status, body) = call(
        &app,
        "PATCH",
        "/api/auth/status",
        Some(login_data.token.as_str()),
        Some(json!({ "status": "Learning Rust" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<UserStatusResponse>(&body).status, "Learning Rust");

    let (_, body) = call(&app, "GET", "/api/auth/status", Some(login_data.token.as_str()), None).await;
    assert_eq!(parse::<UserStatusResponse>(&body).status, "Learning Rust");
}

#[tokio::test]
async fn test_login_response_uses_camel_case_user_id() {
    let app = test_app();
    signup(&app, "camel@test.com", "tester").await;

    let (_, body) = login(&app, "camel@test.com", "tester").await;
    let raw: Value = parse(&body);

    assert!(raw.get("userId").is_some());
    assert!(raw.get("token").is_some());
}

#[tokio::test]
async fn test_login_unknown_email() {
    let (status, body) = login(&test_app(), "nonexistent@test.com", "tester").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "A user with this email could not be found.");
    assert_eq!(error.code.as_deref(), Some("USER_NOT_FOUND"));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = test_app();
    signup(&app, "wrongpass@test.com", "correct-password").await;

    let (status, body) = login(&app, "wrongpass@test.com", "wrong-password").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "Wrong password!");
    assert_eq!(error.code.as_deref(), Some("WRONG_PASSWORD"));
}

#[tokio::test]
async fn test_login_store_failure_is_500() {
    let app = create_test_app(Arc::new(UnavailableStore));

    let (status, body) = login(&app, "test@test.com", "tester").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "An internal error occurred.");
    assert!(!error.error.contains("connection refused"));
}

#[tokio::test]
async fn test_status_requires_token() {
    let app = test_app();

    let (status, body) = call(&app, "GET", "/api/auth/status", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(parse::<ErrorResponse>(&body).error, "Not authenticated.");

    let (status, _) = call(&app, "GET", "/api/auth/status", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_for_deleted_identity_is_404() {
    let signer_app = test_app();
    signup(&signer_app, "ghost@test.com", "tester").await;
    let (_, body) = login(&signer_app, "ghost@test.com", "tester").await;
    let token = parse::<LoginResponse>(&body).token;

    // Same secret, empty store: the token verifies but the identity is gone
    let app = test_app();
    let (status, _) = call(&app, "GET", "/api/auth/status", Some(token.as_str()), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let app = test_app();
    signup(&app, "duplicate@test.com", "tester").await;

    let (status, body) = call(
        &app,
        "PUT",
        "/api/auth/signup",
        None,
        Some(json!({ "email": "duplicate@test.com", "password": "tester", "name": "Again" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.code.as_deref(), Some("VALIDATION_FAILED"));
    assert_eq!(error.details, vec!["E-Mail address already exists!".to_string()]);
}

#[tokio::test]
async fn test_signup_invalid_input() {
    let (status, body) = call(
        &test_app(),
        "PUT",
        "/api/auth/signup",
        None,
        Some(json!({ "email": "not-an-email", "password": "abc", "name": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parse::<ErrorResponse>(&body).details.len(), 3);
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = test_app();

    let (status, body) = call(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<HealthResponse>(&body).status, "ok");

    let (status, body) = call(&app, "GET", "/api/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let doc: Value = parse(&body);
    assert!(doc["paths"].get("/api/auth/login").is_some());
}
