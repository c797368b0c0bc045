pub mod decision;
pub mod identity;
pub mod jwt;
pub mod ownership;
pub mod permissions;

pub use decision::{AuthzError, Decision, DecisionEngine, DenyReason};
pub use identity::IdentityContext;
pub use jwt::{AccessClaims, IssuedTokens, TokenError, TokenService};
pub use permissions::PermissionStore;
