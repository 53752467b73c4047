pub mod auth;
pub mod optional_auth;
pub mod role;

pub use auth::{AuthenticatedSession, SessionAuthMiddleware};
pub use optional_auth::OptionalSessionMiddleware;
pub use role::RequireRole;
