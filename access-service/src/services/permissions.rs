//! Permission store - resolves an identity's permission set.
//!
//! Resolution is a single join across the directory collaborators:
//! identity -> role -> permissions. An identity that is unknown, or whose
//! role has no permissions, resolves to the empty set - that is a valid
//! answer, not an error. Infrastructure failures propagate as
//! [`LookupError`] and are never folded into a denial.

use std::sync::Arc;

use uuid::Uuid;

use crate::db::{LookupError, PermissionLookup, UserLookup};
use crate::models::Permission;

#[derive(Clone)]
pub struct PermissionStore {
    users: Arc<dyn UserLookup>,
    roles: Arc<dyn PermissionLookup>,
}

impl PermissionStore {
    pub fn new(users: Arc<dyn UserLookup>, roles: Arc<dyn PermissionLookup>) -> Self {
        Self { users, roles }
    }

    /// The full permission set of the identity's role.
    pub async fn resolve_permissions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Permission>, LookupError> {
        let Some(user) = self.users.user(user_id).await? else {
            return Ok(Vec::new());
        };
        self.roles.role_permissions(user.role_id).await
    }

    /// Whether the identity's role grants the (action, resource) pair
    /// globally. Owner-scoped grants do not count here; they are checked
    /// against ownership instead of the permission table.
    pub async fn has_permission(
        &self,
        user_id: Uuid,
        action: &str,
        resource: &str,
    ) -> Result<bool, LookupError> {
        let permissions = self.resolve_permissions(user_id).await?;
        Ok(permissions
            .iter()
            .any(|p| !p.owner_scoped && p.grants(action, resource)))
    }

    /// Whether the identity holds the named role.
    pub async fn has_role(&self, user_id: Uuid, role_name: &str) -> Result<bool, LookupError> {
        let Some(user) = self.users.user(user_id).await? else {
            return Ok(false);
        };
        let Some(role) = self.roles.role(user.role_id).await? else {
            return Ok(false);
        };
        Ok(role.name == role_name)
    }

    /// Whether the identity holds any of the named roles.
    pub async fn has_any_role(
        &self,
        user_id: Uuid,
        role_names: &[&str],
    ) -> Result<bool, LookupError> {
        let Some(user) = self.users.user(user_id).await? else {
            return Ok(false);
        };
        let Some(role) = self.roles.role(user.role_id).await? else {
            return Ok(false);
        };
        Ok(role_names.contains(&role.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDirectory;

    async fn seeded_store() -> (PermissionStore, Arc<MemoryDirectory>) {
        let dir = Arc::new(MemoryDirectory::new());
        dir.seed_defaults().await;
        let store = PermissionStore::new(dir.clone(), dir.clone());
        (store, dir)
    }

    #[tokio::test]
    async fn test_resolution_returns_the_seeded_role_set() {
        let (store, dir) = seeded_store().await;
        let user = dir
            .insert_user("mira@example.com", "Mira", "pw-123456", "model")
            .await
            .unwrap();

        let permissions = store.resolve_permissions(user.user_id).await.unwrap();
        let mut keys: Vec<String> = permissions.iter().map(|p| p.key()).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "casting:apply".to_string(),
                "profile:update:own".to_string(),
                "public_castings:view".to_string(),
            ]
        );

        // Repeatable: a second resolution sees the same snapshot.
        let again = store.resolve_permissions(user.user_id).await.unwrap();
        assert_eq!(again, permissions);
    }

    #[tokio::test]
    async fn test_unknown_identity_resolves_to_empty_set() {
        let (store, _dir) = seeded_store().await;
        let permissions = store.resolve_permissions(Uuid::new_v4()).await.unwrap();
        assert!(permissions.is_empty());
    }

    #[tokio::test]
    async fn test_has_permission_checks_the_exact_pair() {
        let (store, dir) = seeded_store().await;
        let user = dir
            .insert_user("mira@example.com", "Mira", "pw-123456", "model")
            .await
            .unwrap();

        assert!(store
            .has_permission(user.user_id, "apply", "casting")
            .await
            .unwrap());
        assert!(!store
            .has_permission(user.user_id, "create", "casting")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_owner_scoped_grants_do_not_satisfy_global_checks() {
        let (store, dir) = seeded_store().await;
        let user = dir
            .insert_user("mira@example.com", "Mira", "pw-123456", "model")
            .await
            .unwrap();

        // The model role holds profile:update:own, not profile:update.
        assert!(!store
            .has_permission(user.user_id, "update", "profile")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_role_membership() {
        let (store, dir) = seeded_store().await;
        let user = dir
            .insert_user("kai@example.com", "Kai", "pw-123456", "photographer")
            .await
            .unwrap();

        assert!(store.has_role(user.user_id, "photographer").await.unwrap());
        assert!(!store.has_role(user.user_id, "admin").await.unwrap());
        assert!(store
            .has_any_role(user.user_id, &["admin", "photographer"])
            .await
            .unwrap());
        assert!(!store
            .has_any_role(user.user_id, &["admin", "model"])
            .await
            .unwrap());
        assert!(!store.has_role(Uuid::new_v4(), "model").await.unwrap());
    }

    #[tokio::test]
    async fn test_reassignment_takes_effect_on_next_resolution() {
        let (store, dir) = seeded_store().await;
        let user = dir
            .insert_user("mira@example.com", "Mira", "pw-123456", "model")
            .await
            .unwrap();
        assert!(!store
            .has_permission(user.user_id, "create", "casting")
            .await
            .unwrap());

        let photographer = dir.role_by_name("photographer").await.unwrap().unwrap();
        dir.assign_role(user.user_id, photographer.role_id)
            .await
            .unwrap();

        assert!(store
            .has_permission(user.user_id, "create", "casting")
            .await
            .unwrap());
    }
}
