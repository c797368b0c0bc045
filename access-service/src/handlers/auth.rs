//! Session handlers - credential exchange for signed tokens.

use axum::{extract::State, Json};
use validator::Validate;

use service_core::error::AppError;

use crate::dtos::auth::{LoginRequest, TokenResponse};
use crate::dtos::ErrorResponse;
use crate::AppState;

/// Exchange email/password credentials for an access token.
///
/// Credential verification happens in the directory collaborator; this
/// handler only orchestrates and never sees a stored hash.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()?;

    let user = state
        .credentials
        .verify_credentials(&req.email, &req.password)
        .await?
        .ok_or_else(|| AppError::Unauthenticated(anyhow::anyhow!("Invalid email or password")))?;

    let role = state
        .roles
        .role(user.role_id)
        .await?
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("User references unknown role")))?;

    let issued = state.jwt.issue(&user, &role.name)?;

    tracing::info!(user_id = %user.user_id, role = %role.name, "Issued access token");

    Ok(Json(TokenResponse {
        access_token: issued.access_token,
        refresh_token: issued.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.access_token_expiry_seconds(),
        expires_at: issued.expires_at,
    }))
}
