pub mod errors;
pub mod middleware;
pub mod session_id;

pub use errors::{ApiError, AuthErrorKind, ErrorResponse};
pub use middleware::{
  AuthenticatedSession, OptionalSessionMiddleware, RequireRole, SessionAuthMiddleware,
};
pub use session_id::extract_session_id;
