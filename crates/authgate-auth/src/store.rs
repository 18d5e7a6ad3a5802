//! User store interface and an in-memory implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Stored principal a login resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable id assigned by the store at creation
    pub id: String,
    /// Unique email used for lookup at login
    pub email: String,
    pub name: String,
    /// PHC-formatted password hash
    pub password_hash: String,
    /// Free-form status; `None` until the user sets one
    pub status: Option<String>,
}

/// Fields needed to create an identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Infrastructure failures of the user store. "Not found" is not an error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User store unavailable: {0}")]
    Unavailable(String),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("User store query failed: {0}")]
    Query(String),
}

/// Persistent user store consumed by the credential verifier
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, StoreError>;

    async fn create(&self, identity: NewIdentity) -> Result<Identity, StoreError>;

    /// Set the status of an identity, returning the updated record or `None`
    /// when no identity has that id
    async fn update_status(&self, id: &str, status: &str)
        -> Result<Option<Identity>, StoreError>;
}

/// `UserStore` backed by a map guarded by an async lock
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, Identity>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == identity.email) {
            return Err(StoreError::DuplicateEmail(identity.email));
        }

        let created = Identity {
            id: uuid::Uuid::new_v4().to_string(),
            email: identity.email,
            name: identity.name,
            password_hash: identity.password_hash,
            status: None,
        };
        users.insert(created.id.clone(), created.clone());

        Ok(created)
    }

    async fn update_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<Option<Identity>, StoreError> {
        let mut users = self.users.write().await;

        Ok(users.get_mut(id).map(|user| {
            user.status = Some(status.to_string());
            user.clone()
        }))
    }
}
