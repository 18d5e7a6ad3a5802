//! Bearer token gate for protected requests
//!
//! The gate runs three ordered checks against an incoming request and stops at
//! the first failure:
//!
//! 1. **Presence**: the designated header (default `Authorization`) is set
//! 2. **Shape**: its value is exactly `Bearer <token>`
//! 3. **Verification**: the token's signature and expiry verify
//!
//! On success the identity's id is attached to the request as an
//! [`AuthContext`] and control moves on. On failure the gate returns
//! [`NotAuthenticated`], which is deliberately a different type from the
//! classified errors of the login flow: it means the request should never
//! have reached a protected handler, and the enclosing pipeline must turn it
//! into a 401.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use authgate_auth::{JwtSigner, JwtValidator, TokenSigner};
//! use authgate_http_auth::{HeaderList, TokenGate};
//!
//! let secret = b"secret";
//! let token = JwtSigner::new(secret).sign("test@test.com", "abc").unwrap();
//! let gate = TokenGate::new(Arc::new(JwtValidator::new(secret)));
//!
//! let mut request = HeaderList::new(vec![(
//!     "Authorization".to_string(),
//!     format!("Bearer {}", token),
//! )]);
//!
//! let forwarded = gate.guard(&mut request, |req| req.user_id().map(str::to_string));
//! assert_eq!(forwarded.unwrap().as_deref(), Some("abc"));
//! ```

mod bearer;
mod header;

pub use bearer::extract_bearer_token;
pub use header::HeaderList;

use std::sync::Arc;

use authgate_auth::TokenVerifier;
use thiserror::Error;
use tracing::debug;

/// Header the gate reads by default
pub const DEFAULT_AUTH_HEADER: &str = "Authorization";

/// Identity established for the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
}

/// Why the gate turned a request away. Logged, never shown to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingHeader,
    MalformedHeader,
    InvalidToken,
}

/// Fatal gate failure. Every reason renders as the same message.
#[must_use = "a gate failure must be turned into a 401 response"]
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Not authenticated.")]
pub struct NotAuthenticated {
    reason: Rejection,
}

impl NotAuthenticated {
    pub fn new(reason: Rejection) -> Self {
        Self { reason }
    }

    pub fn reason(&self) -> Rejection {
        self.reason
    }

    pub fn status_code(&self) -> u16 {
        401
    }
}

impl From<Rejection> for NotAuthenticated {
    fn from(reason: Rejection) -> Self {
        Self::new(reason)
    }
}

/// Request boundary the gate works against
pub trait GatedRequest {
    /// Value of the named header, if present and valid text
    fn header(&self, name: &str) -> Option<&str>;

    /// Attach the authenticated identity for downstream handlers
    fn set_user_id(&mut self, user_id: String);
}

impl<B> GatedRequest for http::Request<B> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }

    fn set_user_id(&mut self, user_id: String) {
        self.extensions_mut().insert(AuthContext { user_id });
    }
}

/// Validates bearer tokens before requests reach protected handlers
#[derive(Clone)]
pub struct TokenGate {
    verifier: Arc<dyn TokenVerifier>,
    header_name: String,
}

impl TokenGate {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            verifier,
            header_name: DEFAULT_AUTH_HEADER.to_string(),
        }
    }

    /// Read the token from a different header
    pub fn with_header(mut self, header_name: impl Into<String>) -> Self {
        self.header_name = header_name.into();
        self
    }

    /// Run the gate's checks and attach the identity on success
    pub fn authenticate<R>(&self, request: &mut R) -> Result<AuthContext, NotAuthenticated>
    where
        R: GatedRequest + ?Sized,
    {
        let header = request
            .header(&self.header_name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| reject(Rejection::MissingHeader))?;

        let token = extract_bearer_token(header).map_err(reject)?;

        let claims = self.verifier.verify(token).map_err(|e| {
            debug!(error = %e, "Token verification failed");
            reject(Rejection::InvalidToken)
        })?;

        request.set_user_id(claims.user_id.clone());

        Ok(AuthContext {
            user_id: claims.user_id,
        })
    }

    /// Authenticate, then hand the request to `next`. `next` runs exactly
    /// once on success and never on failure.
    pub fn guard<R, F, T>(&self, request: &mut R, next: F) -> Result<T, NotAuthenticated>
    where
        R: GatedRequest + ?Sized,
        F: FnOnce(&mut R) -> T,
    {
        self.authenticate(request)?;
        Ok(next(request))
    }
}

fn reject(reason: Rejection) -> NotAuthenticated {
    debug!(?reason, "Request rejected by token gate");
    NotAuthenticated::new(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use authgate_auth::{JwtError, JwtSigner, JwtValidator, SessionClaims, TokenSigner};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SECRET: &[u8] = b"somesupersecretsecret";

    /// Verifier that accepts any token and decodes it to a fixed user
    #[derive(Default)]
    struct StubVerifier {
        calls: AtomicUsize,
    }

    impl TokenVerifier for StubVerifier {
        fn verify(&self, _token: &str) -> Result<SessionClaims, JwtError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SessionClaims::new(
                "abc".to_string(),
                "test@test.com".to_string(),
                chrono::Duration::hours(1),
            )
        }
    }

    fn request_with(value: &str) -> HeaderList {
        HeaderList::new(vec![("Authorization".to_string(), value.to_string())])
    }

    fn jwt_gate() -> TokenGate {
        TokenGate::new(Arc::new(JwtValidator::new(SECRET)))
    }

    #[test]
    fn test_missing_header_is_not_authenticated() {
        let gate = jwt_gate();
        let mut request = HeaderList::default();
        let mut forwarded = 0;

        let err = gate
            .guard(&mut request, |_| forwarded += 1)
            .unwrap_err();

        assert_eq!(err.to_string(), "Not authenticated.");
        assert_eq!(err.reason(), Rejection::MissingHeader);
        assert_eq!(err.status_code(), 401);
        assert_eq!(forwarded, 0);
    }

    #[test]
    fn test_empty_header_counts_as_missing() {
        let err = jwt_gate().authenticate(&mut request_with("")).unwrap_err();
        assert_eq!(err.reason(), Rejection::MissingHeader);
    }

    #[test]
    fn test_single_string_header_is_rejected() {
        let verifier = Arc::new(StubVerifier::default());
        let gate = TokenGate::new(verifier.clone());
        let mut request = request_with("xyz");
        let mut forwarded = 0;

        let err = gate
            .guard(&mut request, |_| forwarded += 1)
            .unwrap_err();

        assert_eq!(err.reason(), Rejection::MalformedHeader);
        assert_eq!(err.to_string(), "Not authenticated.");
        assert_eq!(forwarded, 0);
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(request.user_id(), None);
    }

    #[test]
    fn test_decoded_user_id_is_attached() {
        let verifier = Arc::new(StubVerifier::default());
        let gate = TokenGate::new(verifier.clone());
        let mut request = request_with("Bearer fsdfkjsdk;lfjsdklafjs;daf");
        let mut forwarded = 0;

        gate.guard(&mut request, |_| forwarded += 1).unwrap();

        assert_eq!(request.user_id(), Some("abc"));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(forwarded, 1);
    }

    #[test]
    fn test_unverifiable_token_is_rejected() {
        let mut request = request_with("Bearer xyz");
        let mut forwarded = 0;

        let err = jwt_gate()
            .guard(&mut request, |_| forwarded += 1)
            .unwrap_err();

        assert_eq!(err.reason(), Rejection::InvalidToken);
        assert_eq!(err.to_string(), "Not authenticated.");
        assert_eq!(request.user_id(), None);
        assert_eq!(forwarded, 0);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = JwtSigner::new(SECRET)
            .with_validity(chrono::Duration::seconds(-10))
            .sign("test@test.com", "abc")
            .unwrap();

        let err = jwt_gate()
            .authenticate(&mut request_with(&format!("Bearer {}", token)))
            .unwrap_err();

        assert_eq!(err.reason(), Rejection::InvalidToken);
    }

    #[test]
    fn test_issued_token_round_trips_through_gate() {
        let token = JwtSigner::new(SECRET)
            .sign("test@test.com", "5c0f66b979af55031b34728a")
            .unwrap();
        let mut request = request_with(&format!("Bearer {}", token));

        let context = jwt_gate().authenticate(&mut request).unwrap();

        assert_eq!(context.user_id, "5c0f66b979af55031b34728a");
        assert_eq!(request.user_id(), Some("5c0f66b979af55031b34728a"));
    }

    #[test]
    fn test_custom_header_name() {
        let gate = TokenGate::new(Arc::new(StubVerifier::default())).with_header("X-Access-Token");
        let mut request = HeaderList::new(vec![(
            "x-access-token".to_string(),
            "Bearer anything".to_string(),
        )]);

        assert!(gate.authenticate(&mut request).is_ok());
        assert!(gate.authenticate(&mut request_with("Bearer anything")).is_err());
    }

    #[test]
    fn test_http_request_gets_context_extension() {
        let token = JwtSigner::new(SECRET).sign("test@test.com", "abc").unwrap();
        let mut request = http::Request::builder()
            .uri("/status")
            .header("authorization", format!("Bearer {}", token))
            .body(())
            .unwrap();

        jwt_gate().authenticate(&mut request).unwrap();

        assert_eq!(
            request.extensions().get::<AuthContext>(),
            Some(&AuthContext {
                user_id: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_http_request_without_header() {
        let mut request = http::Request::builder().uri("/status").body(()).unwrap();

        let err = jwt_gate().authenticate(&mut request).unwrap_err();

        assert_eq!(err.reason(), Rejection::MissingHeader);
        assert!(request.extensions().get::<AuthContext>().is_none());
    }
}
