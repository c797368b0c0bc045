//! Casting/profile business plumbing behind a narrow seam.
//!
//! CRUD semantics for castings and profiles are not this service's
//! concern; handlers forward to this trait once the pipeline has allowed
//! the operation. The in-memory implementation backs the binary and the
//! test suite.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use super::LookupError;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CastingSummary {
    pub casting_id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewCasting {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicationReceipt {
    pub application_id: Uuid,
    pub casting_id: Uuid,
    pub applicant_id: Uuid,
    pub submitted_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProfileChanges {
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ProfileView {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

/// Business operations the protected handlers delegate to.
#[async_trait]
pub trait CastingBackend: Send + Sync {
    async fn list_public_castings(&self) -> Result<Vec<CastingSummary>, LookupError>;

    async fn create_casting(
        &self,
        owner_id: Uuid,
        casting: NewCasting,
    ) -> Result<CastingSummary, LookupError>;

    /// Record an application. Returns None when the casting is unknown.
    async fn record_application(
        &self,
        casting_id: Uuid,
        applicant_id: Uuid,
    ) -> Result<Option<ApplicationReceipt>, LookupError>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<ProfileView, LookupError>;
}

#[derive(Default)]
struct CastingState {
    castings: HashMap<Uuid, CastingSummary>,
    applications: Vec<ApplicationReceipt>,
    profiles: HashMap<Uuid, ProfileView>,
}

/// In-memory casting store.
#[derive(Default)]
pub struct MemoryCastings {
    inner: RwLock<CastingState>,
}

impl MemoryCastings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded applications. Test observability hook.
    pub async fn application_count(&self) -> usize {
        self.inner.read().await.applications.len()
    }
}

#[async_trait]
impl CastingBackend for MemoryCastings {
    async fn list_public_castings(&self) -> Result<Vec<CastingSummary>, LookupError> {
        let state = self.inner.read().await;
        let mut castings: Vec<CastingSummary> = state.castings.values().cloned().collect();
        castings.sort_by_key(|c| c.created_utc);
        Ok(castings)
    }

    async fn create_casting(
        &self,
        owner_id: Uuid,
        casting: NewCasting,
    ) -> Result<CastingSummary, LookupError> {
        let summary = CastingSummary {
            casting_id: Uuid::new_v4(),
            owner_id,
            title: casting.title,
            description: casting.description,
            created_utc: Utc::now(),
        };

        let mut state = self.inner.write().await;
        state.castings.insert(summary.casting_id, summary.clone());
        Ok(summary)
    }

    async fn record_application(
        &self,
        casting_id: Uuid,
        applicant_id: Uuid,
    ) -> Result<Option<ApplicationReceipt>, LookupError> {
        let mut state = self.inner.write().await;

        if !state.castings.contains_key(&casting_id) {
            return Ok(None);
        }

        let receipt = ApplicationReceipt {
            application_id: Uuid::new_v4(),
            casting_id,
            applicant_id,
            submitted_utc: Utc::now(),
        };
        state.applications.push(receipt.clone());
        Ok(Some(receipt))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<ProfileView, LookupError> {
        let mut state = self.inner.write().await;
        let profile = state.profiles.entry(user_id).or_insert_with(|| ProfileView {
            user_id,
            ..ProfileView::default()
        });

        if let Some(display_name) = changes.display_name {
            profile.display_name = Some(display_name);
        }
        if let Some(bio) = changes.bio {
            profile.bio = Some(bio);
        }

        Ok(profile.clone())
    }
}
