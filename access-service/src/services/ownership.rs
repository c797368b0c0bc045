//! Ownership guard for owner-scoped resources.

use uuid::Uuid;

/// Whether the identity owns the target resource. Owner-scoped
/// requirements use this check instead of the permission table; it is
/// pure and synchronous.
pub fn is_owner(identity_id: Uuid, owner_id: Uuid) -> bool {
    identity_id == owner_id
}
