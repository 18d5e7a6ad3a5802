//! Credential verifier and login issuer
//!
//! `AuthService` owns the business-level auth operations: signing up,
//! logging in, and reading or changing the status of the logged-in identity.
//! Every expected failure comes back as an [`AuthError`] value; infrastructure
//! faults are classified as 500 and logged with their source.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::AuthError;
use crate::jwt::TokenSigner;
use crate::password::PasswordScheme;
use crate::store::{NewIdentity, StoreError, UserStore};

/// Status reported for an identity that never set one
pub const NEW_USER_STATUS: &str = "I am new!";

const MIN_PASSWORD_LEN: usize = 5;

/// Raw login input. Lives only for the duration of a login call.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user_id: String,
}

/// Signup input
#[derive(Clone, Deserialize)]
pub struct Signup {
    pub email: String,
    pub name: String,
    pub password: String,
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    passwords: Arc<dyn PasswordScheme>,
    signer: Arc<dyn TokenSigner>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        passwords: Arc<dyn PasswordScheme>,
        signer: Arc<dyn TokenSigner>,
    ) -> Self {
        Self {
            store,
            passwords,
            signer,
        }
    }

    /// Verify credentials and issue a signed access token
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, AuthError> {
        let email = normalize_email(&credentials.email);

        let identity = match self.store.find_by_email(&email).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                self.passwords.verify_decoy(&credentials.password);
                warn!("Login failed: unknown email");
                return Err(AuthError::UserNotFound);
            }
            Err(e) => return Err(infrastructure("user lookup by email", e.into())),
        };

        let matches = self
            .passwords
            .verify(&credentials.password, &identity.password_hash)
            .map_err(|e| infrastructure("password verification", e.into()))?;

        if !matches {
            warn!(user_id = %identity.id, "Login failed: wrong password");
            return Err(AuthError::WrongCredential);
        }

        let token = self
            .signer
            .sign(&identity.email, &identity.id)
            .map_err(|e| infrastructure("token signing", e.into()))?;

        info!(user_id = %identity.id, "User logged in");

        Ok(LoginOutcome {
            token,
            user_id: identity.id,
        })
    }

    /// Status of the identity behind an authenticated request
    pub async fn get_user_status(&self, user_id: &str) -> Result<String, AuthError> {
        let identity = self
            .store
            .find_by_id(user_id)
            .await
            .map_err(|e| infrastructure("user lookup by id", e.into()))?
            .ok_or(AuthError::IdentityNotFound)?;

        Ok(identity
            .status
            .unwrap_or_else(|| NEW_USER_STATUS.to_string()))
    }

    /// Replace the status of the identity behind an authenticated request
    pub async fn update_user_status(
        &self,
        user_id: &str,
        status: &str,
    ) -> Result<String, AuthError> {
        let status = status.trim();
        if status.is_empty() {
            return Err(AuthError::validation(
                "Validation failed.",
                vec!["Status must not be empty.".to_string()],
            ));
        }

        let updated = self
            .store
            .update_status(user_id, status)
            .await
            .map_err(|e| infrastructure("status update", e.into()))?
            .ok_or(AuthError::IdentityNotFound)?;

        debug!(user_id = %updated.id, "User status updated");

        Ok(updated
            .status
            .unwrap_or_else(|| NEW_USER_STATUS.to_string()))
    }

    /// Create a new identity, returning its id
    pub async fn signup(&self, signup: &Signup) -> Result<String, AuthError> {
        let email = normalize_email(&signup.email);
        let name = signup.name.trim();

        let mut details = Vec::new();
        if !is_plausible_email(&email) {
            details.push("Please enter a valid email.".to_string());
        }
        if signup.password.trim().chars().count() < MIN_PASSWORD_LEN {
            details.push(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_LEN
            ));
        }
        if name.is_empty() {
            details.push("Name must not be empty.".to_string());
        }
        if !details.is_empty() {
            return Err(AuthError::validation("Validation failed.", details));
        }

        let existing = self
            .store
            .find_by_email(&email)
            .await
            .map_err(|e| infrastructure("user lookup by email", e.into()))?;
        if existing.is_some() {
            return Err(email_taken());
        }

        let password_hash = self
            .passwords
            .hash(signup.password.trim())
            .map_err(|e| infrastructure("password hashing", e.into()))?;

        let created = self
            .store
            .create(NewIdentity {
                email,
                name: name.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::DuplicateEmail(_) => email_taken(),
                other => infrastructure("user creation", other.into()),
            })?;

        info!(user_id = %created.id, "User created");

        Ok(created.id)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn email_taken() -> AuthError {
    AuthError::validation(
        "Validation failed.",
        vec!["E-Mail address already exists!".to_string()],
    )
}

fn infrastructure(operation: &str, source: crate::error::InfrastructureFault) -> AuthError {
    error!(operation, error = %source, "Auth infrastructure failure");
    AuthError::Infrastructure(source)
}
