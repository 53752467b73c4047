use std::sync::Arc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::SessionId;

/// Use case for logging out a single session
pub struct LogoutUserUseCase {
  auth_service: Arc<AuthService>,
}

impl LogoutUserUseCase {
  /// Creates a new instance of LogoutUserUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the user logout use case
  ///
  /// Logging out a session that does not exist succeeds.
  ///
  /// # Errors
  /// Returns `AuthError` for an empty session id or a store failure
  pub async fn execute(&self, session_id: String) -> Result<(), AuthError> {
    let session_id = SessionId::from_string(session_id)?;

    self.auth_service.logout(&session_id).await
  }
}
