use authgate_auth::{Credentials, Signup};
use authgate_http_auth::AuthContext;
use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::models::*;
use crate::AppState;

/// Health check
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create a new user
#[utoipa::path(
    put,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = SignupResponse),
        (status = 422, description = "Invalid input or email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let user_id = state
        .auth
        .signup(&Signup {
            email: req.email,
            name: req.name,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created!".to_string(),
            user_id,
        }),
    ))
}

/// Log in and receive an access token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Unknown email or wrong password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state
        .auth
        .login(&Credentials {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        user_id: outcome.user_id,
    }))
}

/// Status of the authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/status",
    responses(
        (status = 200, description = "Current status", body = UserStatusResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn get_user_status(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<(StatusCode, Json<UserStatusResponse>), ApiError> {
    debug!("Getting status for user: {}", auth.user_id);

    let status = state.auth.get_user_status(&auth.user_id).await?;

    Ok((StatusCode::OK, Json(UserStatusResponse { status })))
}

/// Replace the status of the authenticated user
#[utoipa::path(
    patch,
    path = "/api/auth/status",
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = UserStatusResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse),
        (status = 422, description = "Empty status", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn update_user_status(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<UserStatusResponse>, ApiError> {
    let status = state
        .auth
        .update_user_status(&auth.user_id, &req.status)
        .await?;

    Ok(Json(UserStatusResponse { status }))
}
