//! User handlers: own-profile updates and the privileged role
//! reassignment operation.

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;
use uuid::Uuid;

use service_core::error::AppError;

use crate::db::backend::{ProfileChanges, ProfileView};
use crate::dtos::auth::AssignRoleRequest;
use crate::dtos::ErrorResponse;
use crate::models::UserResponse;
use crate::AppState;

/// Update a user's profile. Ownership of the target profile is enforced
/// by the pipeline before this handler runs.
#[utoipa::path(
    patch,
    path = "/users/{user_id}/profile",
    params(("user_id" = Uuid, Path, description = "Owner of the profile")),
    request_body = ProfileChanges,
    responses(
        (status = 200, description = "Profile updated", body = ProfileView),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the profile owner", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(changes): Json<ProfileChanges>,
) -> Result<Json<ProfileView>, AppError> {
    let profile = state.backend.update_profile(user_id, changes).await?;
    Ok(Json(profile))
}

/// Reassign a user's role. The only way a role reference changes after
/// registration.
#[utoipa::path(
    put,
    path = "/admin/users/{user_id}/role",
    params(("user_id" = Uuid, Path, description = "User to reassign")),
    request_body = AssignRoleRequest,
    responses(
        (status = 200, description = "Role reassigned", body = UserResponse),
        (status = 400, description = "Unknown role", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn assign_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AssignRoleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()?;

    let role = state
        .roles
        .role_by_name(&req.role)
        .await?
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Unknown role: {}", req.role)))?;

    let updated = state.users.assign_role(user_id, role.role_id).await?;
    if !updated {
        return Err(AppError::NotFound(anyhow::anyhow!("User not found")));
    }

    let user = state
        .users
        .user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    tracing::info!(user_id = %user_id, role = %role.name, "Reassigned role");

    Ok(Json(user.sanitized()))
}
