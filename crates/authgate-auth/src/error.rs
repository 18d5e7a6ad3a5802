//! Classified errors returned by the credential verifier

use thiserror::Error;

use crate::jwt::JwtError;
use crate::password::PasswordError;
use crate::store::StoreError;

/// Source of an infrastructure failure. Kept for logging, never rendered.
#[derive(Debug, Error)]
pub enum InfrastructureFault {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),
}

/// Failure of a business-level auth operation, carrying a stable HTTP status
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("A user with this email could not be found.")]
    UserNotFound,

    #[error("Wrong password!")]
    WrongCredential,

    #[error("User not found.")]
    IdentityNotFound,

    /// Malformed input; each entry names one failed rule
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    #[error("An internal error occurred.")]
    Infrastructure(#[source] InfrastructureFault),
}

impl AuthError {
    pub fn validation(message: impl Into<String>, details: Vec<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UserNotFound | Self::WrongCredential => 401,
            Self::IdentityNotFound => 404,
            Self::Validation { .. } => 422,
            Self::Infrastructure(_) => 500,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::WrongCredential => "WRONG_PASSWORD",
            Self::IdentityNotFound => "IDENTITY_NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_FAILED",
            Self::Infrastructure(_) => "INTERNAL_ERROR",
        }
    }

    /// User-visible message
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn details(&self) -> &[String] {
        match self {
            Self::Validation { details, .. } => details,
            _ => &[],
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        Self::Infrastructure(e.into())
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        Self::Infrastructure(e.into())
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        Self::Infrastructure(e.into())
    }
}
