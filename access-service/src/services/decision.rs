//! Authorization decision engine.
//!
//! Evaluates an identity snapshot against an operation's declared
//! requirements. The outcome is a value, never an exception: `Allow`,
//! `Deny(reason)`, or a typed error for conditions that are not
//! authorization answers at all (malformed requirement, failed lookup).
//! A lookup failure must never come back as Allow - and it is not a
//! denial either, so it stays an error.

use thiserror::Error;

use uuid::Uuid;

use crate::db::LookupError;
use crate::registry::Requirement;

use super::identity::IdentityContext;
use super::ownership;
use super::permissions::PermissionStore;

/// Outcome of evaluating an operation's requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Why the operation was denied. Names only the first failing pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No verified identity on the request.
    Unauthenticated,
    /// The identity's role does not grant the requirement.
    Permission(Requirement),
    /// The identity is not the owner of the target resource.
    Ownership(Requirement),
}

/// Non-decision failures during evaluation.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// An owner-scoped requirement was declared but the request carries
    /// no usable owner target. Distinct from a denial.
    #[error("owner-scoped requirement {0} has no owner target on the request")]
    MissingOwnerTarget(Requirement),

    /// Collaborator failure during permission resolution.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

#[derive(Clone)]
pub struct DecisionEngine {
    permissions: PermissionStore,
}

impl DecisionEngine {
    pub fn new(permissions: PermissionStore) -> Self {
        Self { permissions }
    }

    /// Evaluate the requirements in declaration order.
    ///
    /// - No requirements: Allow.
    /// - Unauthenticated identity: Deny(Unauthenticated).
    /// - Owner-scoped requirements check ownership of `owner_target`;
    ///   all others consult the permission store.
    /// - Logical AND with short-circuit: the first failing requirement
    ///   produces the Deny and nothing after it is evaluated.
    ///
    /// Side-effect-free and repeatable for the same identity/role
    /// snapshot; role changes take effect on the next call because
    /// nothing is cached.
    pub async fn decide(
        &self,
        identity: &IdentityContext,
        requirements: &[Requirement],
        owner_target: Option<Uuid>,
    ) -> Result<Decision, AuthzError> {
        if requirements.is_empty() {
            return Ok(Decision::Allow);
        }

        if !identity.is_authenticated {
            return Ok(Decision::Deny(DenyReason::Unauthenticated));
        }

        for requirement in requirements {
            if requirement.owner_scoped {
                let target = owner_target
                    .ok_or_else(|| AuthzError::MissingOwnerTarget(requirement.clone()))?;

                let owns = identity
                    .user_id
                    .map(|id| ownership::is_owner(id, target))
                    .unwrap_or(false);
                if !owns {
                    return Ok(Decision::Deny(DenyReason::Ownership(requirement.clone())));
                }
            } else {
                let granted = match identity.user_id {
                    Some(user_id) => {
                        self.permissions
                            .has_permission(user_id, &requirement.action, &requirement.resource)
                            .await?
                    }
                    // A verified token whose subject is not a directory
                    // id cannot hold role permissions.
                    None => false,
                };
                if !granted {
                    return Ok(Decision::Deny(DenyReason::Permission(requirement.clone())));
                }
            }
        }

        Ok(Decision::Allow)
    }
}
