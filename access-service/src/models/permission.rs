//! Permission model - open (action, resource) capability grants.

use serde::{Deserialize, Serialize};

/// A single capability grant. Action and resource are open strings so new
/// pairs can be added without a schema change; permissions with the owner
/// scope apply to the caller's own resources and are checked against
/// ownership rather than the permission table.
///
/// Canonical key format: `{resource}:{action}[:own]`,
/// e.g. `"casting:apply"` or `"profile:update:own"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub resource: String,
    pub action: String,
    pub owner_scoped: bool,
}

impl Permission {
    /// Create a globally-scoped permission.
    pub fn new(resource: &str, action: &str) -> Self {
        Self {
            resource: resource.to_string(),
            action: action.to_string(),
            owner_scoped: false,
        }
    }

    /// Create an owner-scoped permission.
    pub fn owned(resource: &str, action: &str) -> Self {
        Self {
            resource: resource.to_string(),
            action: action.to_string(),
            owner_scoped: true,
        }
    }

    /// Canonical key for storage and logging.
    pub fn key(&self) -> String {
        if self.owner_scoped {
            format!("{}:{}:own", self.resource, self.action)
        } else {
            format!("{}:{}", self.resource, self.action)
        }
    }

    /// Parse a canonical key. Returns None for anything other than
    /// `resource:action` or `resource:action:own`.
    pub fn parse_key(key: &str) -> Option<Self> {
        let parts: Vec<&str> = key.split(':').collect();
        match parts.as_slice() {
            [resource, action] if !resource.is_empty() && !action.is_empty() => {
                Some(Self::new(resource, action))
            }
            [resource, action, "own"] if !resource.is_empty() && !action.is_empty() => {
                Some(Self::owned(resource, action))
            }
            _ => None,
        }
    }

    /// Whether this grant covers the given (action, resource) pair.
    pub fn grants(&self, action: &str, resource: &str) -> bool {
        self.action == action && self.resource == resource
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
