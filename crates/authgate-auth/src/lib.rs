//! Credential verification and token issuing for authgate

pub mod error;
pub mod jwt;
pub mod password;
pub mod service;
pub mod store;

pub use error::{AuthError, InfrastructureFault};
pub use jwt::{
    JwtError, JwtSigner, JwtValidator, SessionClaims, TokenSigner, TokenVerifier,
    DEFAULT_TOKEN_VALIDITY_SECS,
};
pub use password::{hash_password, verify_password, Argon2Scheme, PasswordError, PasswordScheme};
pub use service::{AuthService, Credentials, LoginOutcome, Signup, NEW_USER_STATUS};
pub use store::{Identity, InMemoryUserStore, NewIdentity, StoreError, UserStore};
