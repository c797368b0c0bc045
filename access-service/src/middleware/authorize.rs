//! Request authorization pipeline.
//!
//! The single funnel for every operation: it reads the operation's
//! statically declared requirements from the registry and asks the
//! decision engine before the handler can run. Handlers never perform
//! authorization themselves, and a denied or rejected request never
//! reaches one. This middleware is also the only place where decisions
//! become transport outcomes (401/403/400/5xx).

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use service_core::error::AppError;

use crate::services::{AuthzError, Decision, DenyReason, IdentityContext};
use crate::AppState;

pub async fn authorize_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Unrouted requests carry no matched path; the router will 404 them.
    let Some(matched) = req.extensions().get::<MatchedPath>() else {
        return Ok(next.run(req).await);
    };
    let operation = format!("{} {}", req.method(), matched.as_str());

    let Some(declared) = state.registry.requirements_for(&operation) else {
        return Ok(next.run(req).await);
    };
    if declared.requirements.is_empty() {
        return Ok(next.run(req).await);
    }

    let identity = req
        .extensions()
        .get::<IdentityContext>()
        .cloned()
        .ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Authorization pipeline ran without identity context"
            ))
        })?;

    let owner_target = declared
        .owner_param
        .and_then(|param| path_param(matched.as_str(), req.uri().path(), param))
        .and_then(|raw| Uuid::parse_str(raw).ok());

    let decision = state
        .engine
        .decide(&identity, &declared.requirements, owner_target)
        .await
        .map_err(|e| match e {
            AuthzError::MissingOwnerTarget(requirement) => {
                tracing::warn!(operation = %operation, requirement = %requirement, "Owner target missing or unparseable");
                AppError::MalformedRequirement(format!(
                    "Operation requires an owner target for {}",
                    requirement
                ))
            }
            AuthzError::Lookup(err) => {
                tracing::error!(operation = %operation, error = %err, "Permission resolution failed");
                AppError::from(err)
            }
        })?;

    match decision {
        Decision::Allow => Ok(next.run(req).await),
        Decision::Deny(DenyReason::Unauthenticated) => {
            tracing::warn!(operation = %operation, "Rejecting unauthenticated request");
            Err(AppError::Unauthenticated(anyhow::anyhow!(
                "Authentication required"
            )))
        }
        Decision::Deny(DenyReason::Permission(requirement))
        | Decision::Deny(DenyReason::Ownership(requirement)) => {
            tracing::warn!(
                operation = %operation,
                user_id = ?identity.user_id,
                requirement = %requirement,
                "Permission denied"
            );
            Err(AppError::PermissionDenied {
                action: requirement.action,
                resource: requirement.resource,
            })
        }
    }
}

/// Extract the value of a named path parameter by walking the matched
/// route pattern against the concrete request path.
fn path_param<'a>(pattern: &str, path: &'a str, name: &str) -> Option<&'a str> {
    let marker = format!(":{}", name);
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (Some(p), Some(v)) => {
                if p == marker {
                    return Some(v);
                }
            }
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_param_extraction() {
        assert_eq!(
            path_param("/users/:user_id/profile", "/users/42/profile", "user_id"),
            Some("42")
        );
        assert_eq!(
            path_param(
                "/castings/:casting_id/applications",
                "/castings/abc/applications",
                "casting_id"
            ),
            Some("abc")
        );
    }

    #[test]
    fn test_path_param_absent() {
        assert_eq!(path_param("/castings", "/castings", "user_id"), None);
        assert_eq!(
            path_param("/users/:user_id/profile", "/users/42/profile", "other"),
            None
        );
    }
}
