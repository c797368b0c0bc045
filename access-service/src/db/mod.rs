//! Collaborator interfaces for persistence-backed lookups.
//!
//! The authorization core never talks to storage directly; it consumes
//! these narrow traits. A failed lookup is infrastructure trouble and is
//! reported as [`LookupError`] - it is never converted into a denial.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Permission, Role, User};

pub mod backend;
pub mod memory;

pub use backend::{CastingBackend, MemoryCastings};
pub use memory::MemoryDirectory;

/// Infrastructure failure during a directory lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt directory record: {0}")]
    Corrupt(String),
}

impl From<LookupError> for service_core::error::AppError {
    fn from(err: LookupError) -> Self {
        service_core::error::AppError::LookupFailure(anyhow::Error::new(err))
    }
}

/// User directory reads, plus the single privileged mutation the model
/// allows (role reassignment).
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn user(&self, user_id: Uuid) -> Result<Option<User>, LookupError>;

    /// Reassign a user's role. Returns false when the user is unknown.
    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, LookupError>;
}

/// Role and permission reads. Resolution of an identity's permission set
/// is a single join across these two traits: user -> role -> permissions.
#[async_trait]
pub trait PermissionLookup: Send + Sync {
    async fn role(&self, role_id: Uuid) -> Result<Option<Role>, LookupError>;

    async fn role_by_name(&self, name: &str) -> Result<Option<Role>, LookupError>;

    async fn role_permissions(&self, role_id: Uuid) -> Result<Vec<Permission>, LookupError>;
}

/// Credential check used by the login handler. Returns the matching user
/// on success, None for unknown email or wrong password.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, LookupError>;
}
