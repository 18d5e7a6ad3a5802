//! Maps auth failures onto HTTP responses

use authgate_auth::AuthError;
use authgate_http_auth::NotAuthenticated;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Every failure a handler or the auth middleware can produce
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Gate(#[from] NotAuthenticated),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::Auth(e) => e.status_code(),
            Self::Gate(e) => e.status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Auth(e) => ErrorResponse {
                error: e.message(),
                code: Some(e.code().to_string()),
                details: e.details().to_vec(),
            },
            Self::Gate(e) => ErrorResponse {
                error: e.to_string(),
                code: Some("NOT_AUTHENTICATED".to_string()),
                details: Vec::new(),
            },
        };

        (status, Json(body)).into_response()
    }
}
