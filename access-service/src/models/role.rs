//! Role model - a named permission bundle referenced by many users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role entity. Names are unique; roles are seed data and rarely change
/// at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub role_id: Uuid,
    pub name: String,
    pub created_utc: DateTime<Utc>,
}

impl Role {
    /// Create a new role.
    pub fn new(name: String) -> Self {
        Self {
            role_id: Uuid::new_v4(),
            name,
            created_utc: Utc::now(),
        }
    }
}
