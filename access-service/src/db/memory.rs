//! In-memory reference implementation of the directory traits.
//!
//! Read-mostly shared state behind an `RwLock`; concurrent authorization
//! decisions take read locks only. Real persistence lives behind the same
//! traits in other deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Permission, Role, User};
use crate::utils::password::{hash_password, verify_password, Password, PasswordHashString};

use super::{CredentialVerifier, LookupError, PermissionLookup, UserLookup};

#[derive(Default)]
struct DirectoryState {
    users: HashMap<Uuid, User>,
    roles: HashMap<Uuid, Role>,
    role_permissions: HashMap<Uuid, Vec<Permission>>,
    credentials: HashMap<Uuid, PasswordHashString>,
}

/// In-memory user/role/permission directory.
#[derive(Default)]
pub struct MemoryDirectory {
    inner: RwLock<DirectoryState>,
}

/// Permission sets for the seeded roles.
fn seed_roles() -> Vec<(&'static str, Vec<Permission>)> {
    let model = vec![
        Permission::new("public_castings", "view"),
        Permission::new("casting", "apply"),
        Permission::owned("profile", "update"),
    ];
    let photographer = vec![
        Permission::new("public_castings", "view"),
        Permission::new("casting", "create"),
        Permission::owned("profile", "update"),
    ];
    let mut admin: Vec<Permission> = Vec::new();
    for perm in model.iter().chain(photographer.iter()) {
        if !admin.contains(perm) {
            admin.push(perm.clone());
        }
    }
    admin.push(Permission::new("roles", "assign"));

    vec![
        ("model", model),
        ("photographer", photographer),
        ("admin", admin),
    ]
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the default roles and their permission sets.
    ///
    /// Idempotent: if any permission already exists the directory is
    /// considered seeded and nothing is inserted. Returns whether this
    /// call performed the seeding.
    pub async fn seed_defaults(&self) -> bool {
        let mut state = self.inner.write().await;

        let already_seeded = state.role_permissions.values().any(|perms| !perms.is_empty());
        if already_seeded {
            return false;
        }

        for (name, permissions) in seed_roles() {
            let role = Role::new(name.to_string());
            state.role_permissions.insert(role.role_id, permissions);
            state.roles.insert(role.role_id, role);
        }

        tracing::info!(roles = state.roles.len(), "Seeded default roles");
        true
    }

    /// Register a user with the named role. Bootstrap/test helper; user
    /// registration proper is an external concern.
    pub async fn insert_user(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
        role_name: &str,
    ) -> Result<User, anyhow::Error> {
        let mut state = self.inner.write().await;

        if state.users.values().any(|u| u.email == email) {
            anyhow::bail!("email already registered: {}", email);
        }

        let role_id = state
            .roles
            .values()
            .find(|r| r.name == role_name)
            .map(|r| r.role_id)
            .ok_or_else(|| anyhow::anyhow!("unknown role: {}", role_name))?;

        let user = User::new(email.to_string(), display_name.to_string(), role_id);
        let hash = hash_password(&Password::new(password.to_string()))?;

        state.credentials.insert(user.user_id, hash);
        state.users.insert(user.user_id, user.clone());

        Ok(user)
    }
}

#[async_trait]
impl UserLookup for MemoryDirectory {
    async fn user(&self, user_id: Uuid) -> Result<Option<User>, LookupError> {
        let state = self.inner.read().await;
        Ok(state.users.get(&user_id).cloned())
    }

    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, LookupError> {
        let mut state = self.inner.write().await;

        if !state.roles.contains_key(&role_id) {
            return Err(LookupError::Corrupt(format!("unknown role id {}", role_id)));
        }

        match state.users.get_mut(&user_id) {
            Some(user) => {
                user.role_id = role_id;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl PermissionLookup for MemoryDirectory {
    async fn role(&self, role_id: Uuid) -> Result<Option<Role>, LookupError> {
        let state = self.inner.read().await;
        Ok(state.roles.get(&role_id).cloned())
    }

    async fn role_by_name(&self, name: &str) -> Result<Option<Role>, LookupError> {
        let state = self.inner.read().await;
        Ok(state.roles.values().find(|r| r.name == name).cloned())
    }

    async fn role_permissions(&self, role_id: Uuid) -> Result<Vec<Permission>, LookupError> {
        let state = self.inner.read().await;
        Ok(state
            .role_permissions
            .get(&role_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl CredentialVerifier for MemoryDirectory {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, LookupError> {
        let (user, hash) = {
            let state = self.inner.read().await;
            let Some(user) = state.users.values().find(|u| u.email == email).cloned() else {
                return Ok(None);
            };
            let Some(hash) = state.credentials.get(&user.user_id).cloned() else {
                return Ok(None);
            };
            (user, hash)
        };

        if verify_password(&Password::new(password.to_string()), &hash).is_ok() {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}
