pub mod auth;
pub mod authorize;

pub use auth::authenticate_middleware;
pub use authorize::authorize_middleware;
