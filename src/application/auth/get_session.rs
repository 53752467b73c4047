use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::entities::Session;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::{SessionId, UserRole};

/// Read-only view of a session, timestamps as Unix epoch seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
  pub session_id: String,
  pub user_id: Uuid,
  pub email: String,
  pub role: UserRole,
  pub created_at: i64,
  pub expires_at: i64,
}

impl From<Session> for SessionView {
  fn from(session: Session) -> Self {
    Self {
      user_id: session.user_id,
      email: session.email,
      role: session.role,
      created_at: session.created_at.timestamp(),
      expires_at: session.expires_at.timestamp(),
      session_id: session.id.into_inner(),
    }
  }
}

/// Use case for inspecting a session without checking its owner
pub struct GetSessionUseCase {
  auth_service: Arc<AuthService>,
}

impl GetSessionUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  pub async fn execute(&self, session_id: String) -> Result<SessionView, AuthError> {
    let session_id = SessionId::from_string(session_id)?;

    let session = self.auth_service.get_session(&session_id).await?;

    Ok(session.into())
  }
}
