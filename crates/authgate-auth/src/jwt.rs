//! JWT (JSON Web Token) handling

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default lifetime of an access token issued at login
pub const DEFAULT_TOKEN_VALIDITY_SECS: i64 = 60 * 60;

/// JWT claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Id of the identity the token was issued to
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Email the identity logged in with
    pub email: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Build claims issued now and expiring after `validity`.
    ///
    /// Fails with [`JwtError::ValidityOutOfRange`] when the expiry does not fit
    /// in the supported date range.
    pub fn new(user_id: String, email: String, validity: Duration) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(validity)
            .ok_or(JwtError::ValidityOutOfRange)?;

        Ok(Self {
            user_id,
            email,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token validity is out of range")]
    ValidityOutOfRange,
}

/// Signing half of the token primitive, used by the login issuer
pub trait TokenSigner: Send + Sync {
    /// Sign a token binding `email` and `user_id` with the signer's fixed expiry
    fn sign(&self, email: &str, user_id: &str) -> Result<String, JwtError>;
}

/// Verifying half of the token primitive, the only thing the token gate needs
pub trait TokenVerifier: Send + Sync {
    /// Verify the signature and expiry of `token` and decode its claims
    fn verify(&self, token: &str) -> Result<SessionClaims, JwtError>;
}

/// HMAC-SHA256 token signer
pub struct JwtSigner {
    encoding_key: EncodingKey,
    validity: Duration,
}

impl JwtSigner {
    /// Create a signer with the default one hour validity
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            validity: Duration::seconds(DEFAULT_TOKEN_VALIDITY_SECS),
        }
    }

    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// Encode arbitrary claims with this signer's key
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, JwtError> {
        Ok(encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding_key,
        )?)
    }
}

impl TokenSigner for JwtSigner {
    fn sign(&self, email: &str, user_id: &str) -> Result<String, JwtError> {
        let claims = SessionClaims::new(user_id.to_string(), email.to_string(), self.validity)?;
        self.encode(&claims)
    }
}

/// JWT validator
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Create a new JWT validator using HMAC-SHA256 (symmetric secret)
    ///
    /// Validates signature and expiration only, with no clock leeway.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn validate(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                    JwtError::TokenExpired
                } else {
                    JwtError::EncodingError(e)
                }
            })?;

        if token_data.claims.is_expired() {
            return Err(JwtError::TokenExpired);
        }
        if token_data.claims.user_id.is_empty() {
            return Err(JwtError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

impl TokenVerifier for JwtValidator {
    fn verify(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.validate(token)
    }
}
