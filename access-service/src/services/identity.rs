//! Identity context - the per-request view of the calling identity.
//!
//! Built purely from already-verified token claims; no network or
//! storage calls. Every authorization decision receives this snapshot as
//! an explicit argument - there is no ambient "current user".

use uuid::Uuid;

use super::jwt::AccessClaims;

/// The calling identity for one request.
#[derive(Debug, Clone)]
pub struct IdentityContext {
    /// Parsed subject claim; None when the subject is not a valid id.
    pub user_id: Option<Uuid>,
    /// Display name claim.
    pub user_name: Option<String>,
    /// Role names carried by the token (one role per identity in this
    /// model, kept as a list for the wire shape).
    pub roles: Vec<String>,
    /// Whether the request carried a successfully verified token. True
    /// even when the subject claim failed to parse.
    pub is_authenticated: bool,
}

impl IdentityContext {
    /// Context for a request without credentials.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            user_name: None,
            roles: Vec::new(),
            is_authenticated: false,
        }
    }

    /// Materialize the identity from verified claims.
    pub fn from_claims(claims: &AccessClaims) -> Self {
        Self {
            user_id: Uuid::parse_str(&claims.sub).ok(),
            user_name: Some(claims.name.clone()),
            roles: vec![claims.role.clone()],
            is_authenticated: true,
        }
    }
}
