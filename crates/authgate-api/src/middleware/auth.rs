//! Token gate middleware
//!
//! Runs the [`TokenGate`] in front of protected routes. On success the
//! [`AuthContext`](authgate_http_auth::AuthContext) is available to handlers
//! through Axum's `Extension`; on failure the request never reaches the
//! handler and a 401 is returned.

use authgate_http_auth::TokenGate;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;

/// Authentication middleware for protected routes
///
/// Expects `Authorization: Bearer <token>`. Returns 401 Unauthorized with the
/// message "Not authenticated." if:
/// - The Authorization header is missing
/// - The header is not exactly `Bearer <token>`
/// - The token signature does not verify or the token has expired
pub async fn require_auth(
    State(gate): State<TokenGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    gate.authenticate(&mut request)?;

    Ok(next.run(request).await)
}
