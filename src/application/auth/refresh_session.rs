use std::sync::Arc;

use super::get_session::SessionView;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::SessionId;

/// Use case for pulling the owner's current email and role into a session
pub struct RefreshSessionUseCase {
  auth_service: Arc<AuthService>,
}

impl RefreshSessionUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Rewrites the session snapshot; the expiry does not move
  pub async fn execute(&self, session_id: String) -> Result<SessionView, AuthError> {
    let session_id = SessionId::from_string(session_id)?;

    let session = self.auth_service.refresh_session(&session_id).await?;

    Ok(session.into())
  }
}
