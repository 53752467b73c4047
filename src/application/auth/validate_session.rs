use std::sync::Arc;

use crate::domain::auth::entities::PublicUser;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::SessionId;

/// The authenticated owner of a session
#[derive(Debug, Clone)]
pub struct ValidateSessionResponse {
  pub user: PublicUser,
  pub session_id: String,
}

/// Use case for resolving a session id to the current user
pub struct ValidateSessionUseCase {
  auth_service: Arc<AuthService>,
}

impl ValidateSessionUseCase {
  /// Creates a new instance of ValidateSessionUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the validate session use case
  ///
  /// # Arguments
  /// * `session_id` - The session id presented by the caller
  ///
  /// # Errors
  /// Returns `AuthError` if the session is unknown or expired, or its owner
  /// is missing or deactivated
  pub async fn execute(&self, session_id: String) -> Result<ValidateSessionResponse, AuthError> {
    let session_id = SessionId::from_string(session_id)?;

    let user = self.auth_service.validate_session(&session_id).await?;

    Ok(ValidateSessionResponse {
      user: PublicUser::from(&user),
      session_id: session_id.into_inner(),
    })
  }
}
