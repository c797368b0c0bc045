//! User model - the identities authorization decisions are made about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User entity. The id is immutable for the lifetime of the account and
/// every user carries exactly one role reference; the role is reassigned
/// only through the privileged admin operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role_id: Uuid,
    pub created_utc: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given role.
    pub fn new(email: String, display_name: String, role_id: Uuid) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            email,
            display_name,
            role_id,
            created_utc: Utc::now(),
        }
    }

    /// Convert to the API response shape (no internal fields).
    pub fn sanitized(&self) -> UserResponse {
        UserResponse::from(self.clone())
    }
}

/// User response for API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role_id: Uuid,
    pub created_utc: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            user_id: u.user_id,
            email: u.email,
            display_name: u.display_name,
            role_id: u.role_id,
            created_utc: u.created_utc,
        }
    }
}
