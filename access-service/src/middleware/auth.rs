//! Authentication middleware - token verification and identity
//! materialization.
//!
//! Runs on every request. A missing Authorization header yields an
//! anonymous context so public operations stay public; a header that is
//! present but fails verification is terminal (401) - presenting a token
//! is a claim to authentication and a bad one is never downgraded to
//! anonymous.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use service_core::error::AppError;

use crate::services::IdentityContext;
use crate::AppState;

pub async fn authenticate_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let identity = match bearer {
        None => IdentityContext::anonymous(),
        Some(token) => {
            let claims = state.jwt.validate(token).map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AppError::Unauthenticated(anyhow::anyhow!("Invalid or expired token"))
            })?;
            IdentityContext::from_claims(&claims)
        }
    };

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Extractor for the identity context in handlers.
#[axum::async_trait]
impl<S> FromRequestParts<S> for IdentityContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<IdentityContext>().cloned().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Identity context missing from request extensions"
            ))
        })
    }
}
