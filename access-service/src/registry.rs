//! Static requirement registry.
//!
//! Every protected operation declares its authorization requirements
//! here, once, at startup - the registry is the auditable list of what
//! the pipeline enforces. Requirements are attached to an operation id of
//! the form `"METHOD /route/pattern"` and are never mutated at runtime.

use std::collections::HashMap;

/// A declared (action, resource) demand on the caller. Owner-scoped
/// requirements are satisfied by ownership of the target resource rather
/// than by the permission table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    pub action: String,
    pub resource: String,
    pub owner_scoped: bool,
}

impl Requirement {
    pub fn new(resource: &str, action: &str) -> Self {
        Self {
            action: action.to_string(),
            resource: resource.to_string(),
            owner_scoped: false,
        }
    }

    pub fn owned(resource: &str, action: &str) -> Self {
        Self {
            action: action.to_string(),
            resource: resource.to_string(),
            owner_scoped: true,
        }
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.owner_scoped {
            write!(f, "{}:{}:own", self.resource, self.action)
        } else {
            write!(f, "{}:{}", self.resource, self.action)
        }
    }
}

/// The requirements of one operation, in declaration order, plus the name
/// of the path parameter carrying the owner id for owner-scoped checks.
#[derive(Debug, Clone, Default)]
pub struct OperationRequirements {
    pub requirements: Vec<Requirement>,
    pub owner_param: Option<&'static str>,
}

/// Operation id -> declared requirements. Built once at startup.
#[derive(Debug, Default)]
pub struct RequirementRegistry {
    operations: HashMap<String, OperationRequirements>,
}

impl RequirementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an operation's requirements.
    pub fn declare(mut self, operation: &str, requirements: Vec<Requirement>) -> Self {
        self.operations.insert(
            operation.to_string(),
            OperationRequirements {
                requirements,
                owner_param: None,
            },
        );
        self
    }

    /// Declare an operation whose owner-scoped requirements read the
    /// target owner id from the named path parameter.
    pub fn declare_with_owner(
        mut self,
        operation: &str,
        requirements: Vec<Requirement>,
        owner_param: &'static str,
    ) -> Self {
        self.operations.insert(
            operation.to_string(),
            OperationRequirements {
                requirements,
                owner_param: Some(owner_param),
            },
        );
        self
    }

    pub fn requirements_for(&self, operation: &str) -> Option<&OperationRequirements> {
        self.operations.get(operation)
    }

    /// All declared operations, for audit output.
    pub fn operations(&self) -> impl Iterator<Item = (&str, &OperationRequirements)> {
        self.operations.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// The protected surface of this service.
pub fn default_registry() -> RequirementRegistry {
    RequirementRegistry::new()
        .declare(
            "GET /castings",
            vec![Requirement::new("public_castings", "view")],
        )
        .declare("POST /castings", vec![Requirement::new("casting", "create")])
        .declare(
            "POST /castings/:casting_id/applications",
            vec![Requirement::new("casting", "apply")],
        )
        .declare_with_owner(
            "PATCH /users/:user_id/profile",
            vec![Requirement::owned("profile", "update")],
            "user_id",
        )
        .declare(
            "PUT /admin/users/:user_id/role",
            vec![Requirement::new("roles", "assign")],
        )
}
