//! Bearer token extraction (RFC 6750)
//!
//! # Format
//!
//! ```text
//! Authorization: Bearer <token>
//! ```

use crate::Rejection;

const SCHEME: &str = "Bearer";

/// Split an `Authorization` value into its token.
///
/// The value must split on single spaces into exactly two parts, the first
/// being the `Bearer` scheme (ASCII case-insensitive) and the second a
/// non-empty token.
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, Rejection> {
    let mut parts = auth_header.split(' ');

    let (scheme, token) = match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) => (scheme, token),
        _ => return Err(Rejection::MalformedHeader),
    };

    if !scheme.eq_ignore_ascii_case(SCHEME) || token.is_empty() {
        return Err(Rejection::MalformedHeader);
    }

    Ok(token)
}
