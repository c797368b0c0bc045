//! Casting handlers. Thin by design: the pipeline has already authorized
//! the operation, and the business work belongs to the backend
//! collaborator.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use service_core::error::AppError;

use crate::db::backend::{ApplicationReceipt, CastingSummary, NewCasting};
use crate::dtos::ErrorResponse;
use crate::services::IdentityContext;
use crate::AppState;

/// List public castings.
#[utoipa::path(
    get,
    path = "/castings",
    responses(
        (status = 200, description = "Public castings", body = [CastingSummary]),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Castings"
)]
pub async fn list_castings(
    State(state): State<AppState>,
) -> Result<Json<Vec<CastingSummary>>, AppError> {
    let castings = state.backend.list_public_castings().await?;
    Ok(Json(castings))
}

/// Create a casting owned by the caller.
#[utoipa::path(
    post,
    path = "/castings",
    request_body = NewCasting,
    responses(
        (status = 200, description = "Casting created", body = CastingSummary),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Castings"
)]
pub async fn create_casting(
    State(state): State<AppState>,
    identity: IdentityContext,
    Json(req): Json<NewCasting>,
) -> Result<Json<CastingSummary>, AppError> {
    let owner_id = identity
        .user_id
        .ok_or_else(|| AppError::Unauthenticated(anyhow::anyhow!("Subject is not a user id")))?;

    let casting = state.backend.create_casting(owner_id, req).await?;
    Ok(Json(casting))
}

/// Apply to a casting.
#[utoipa::path(
    post,
    path = "/castings/{casting_id}/applications",
    params(("casting_id" = Uuid, Path, description = "Casting to apply to")),
    responses(
        (status = 200, description = "Application recorded", body = ApplicationReceipt),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 404, description = "Unknown casting", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Castings"
)]
pub async fn apply_to_casting(
    State(state): State<AppState>,
    identity: IdentityContext,
    Path(casting_id): Path<Uuid>,
) -> Result<Json<ApplicationReceipt>, AppError> {
    let applicant_id = identity
        .user_id
        .ok_or_else(|| AppError::Unauthenticated(anyhow::anyhow!("Subject is not a user id")))?;

    let receipt = state
        .backend
        .record_application(casting_id, applicant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Casting not found")))?;

    Ok(Json(receipt))
}
