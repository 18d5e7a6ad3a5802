//! Password hashing and verification using Argon2id

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2,
};
use thiserror::Error;

/// Error types for password operations
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHashFormat(String),
}

/// Password hashing primitive consumed by the credential verifier.
///
/// `verify` returns `Ok(false)` for a mismatch and reserves `Err` for faults in
/// the primitive itself (for example a corrupt stored hash).
pub trait PasswordScheme: Send + Sync {
    /// Hash a plain text password into a storable string
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Verify a plain text password against a stored hash
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError>;

    /// Burn one verification worth of work when there is no stored hash to
    /// compare against, so an unknown account costs as much as a known one.
    fn verify_decoy(&self, _password: &str) {}
}

/// Argon2id implementation of [`PasswordScheme`]
pub struct Argon2Scheme {
    decoy_hash: String,
}

impl Argon2Scheme {
    /// Create a new scheme. Hashes a throwaway password once so decoy
    /// verifications run against a real PHC string with the same parameters.
    pub fn new() -> Result<Self, PasswordError> {
        Ok(Self {
            decoy_hash: hash_password("authgate-decoy-password")?,
        })
    }
}

impl PasswordScheme for Argon2Scheme {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        hash_password(password)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        verify_password(password, hash)
    }

    fn verify_decoy(&self, password: &str) {
        let _ = verify_password(password, &self.decoy_hash);
    }
}

/// Hash a password using Argon2id
///
/// Uses `Argon2::default()` (Argon2id, m=19456 KiB, t=2, p=1) with a random
/// 16-byte salt.
///
/// # Returns
/// * `Ok(String)` - PHC-formatted hash string (suitable for storage)
/// * `Err(PasswordError)` - If hashing fails
///
/// # Example
/// ```
/// use authgate_auth::password::hash_password;
///
/// let hash = hash_password("MySecurePassword123!").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a password against a hash
///
/// # Returns
/// * `Ok(true)` - Password matches hash
/// * `Ok(false)` - Password does not match hash
/// * `Err(PasswordError)` - If hash format is invalid or verification fails
///
/// # Example
/// ```
/// use authgate_auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("MyPassword123!").unwrap();
/// assert!(verify_password("MyPassword123!", &hash).unwrap());
/// assert!(!verify_password("WrongPassword", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHashFormat(e.to_string()))?;

    // A PHC string without an output, or from another algorithm, is a corrupt record
    if parsed_hash.hash.is_none() {
        return Err(PasswordError::InvalidHashFormat(
            "missing hash output".to_string(),
        ));
    }
    if Algorithm::try_from(parsed_hash.algorithm).is_err() {
        return Err(PasswordError::InvalidHashFormat(format!(
            "unsupported algorithm {}",
            parsed_hash.algorithm
        )));
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
    }
}
