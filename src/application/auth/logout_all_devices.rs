use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;

/// Response after logging out from all devices
#[derive(Debug, Clone)]
pub struct LogoutAllDevicesResponse {
  /// Number of sessions that were terminated
  pub sessions_terminated: usize,
}

/// Use case for logging out a user from all devices
pub struct LogoutAllDevicesUseCase {
  auth_service: Arc<AuthService>,
}

impl LogoutAllDevicesUseCase {
  /// Creates a new instance of LogoutAllDevicesUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the logout all devices use case
  ///
  /// # Errors
  /// Returns `AuthError` if the operation fails (e.g., user not found)
  pub async fn execute(&self, user_id: Uuid) -> Result<LogoutAllDevicesResponse, AuthError> {
    let sessions_terminated = self.auth_service.logout_all(user_id).await?;

    Ok(LogoutAllDevicesResponse {
      sessions_terminated,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::application::auth::test_support::test_context;
  use crate::application::auth::{
    LoginUserCommand, LoginUserUseCase, RegisterUserCommand, RegisterUserUseCase,
  };

  #[tokio::test]
  async fn test_terminates_every_session() {
    let ctx = test_context();
    let registered = RegisterUserUseCase::new(ctx.service.clone())
      .execute(RegisterUserCommand {
        email: "all@example.com".to_string(),
        password: "password123".to_string(),
        first_name: "All".to_string(),
        last_name: "Devices".to_string(),
        role: "admin".to_string(),
      })
      .await
      .unwrap();

    let login = LoginUserUseCase::new(ctx.service.clone());
    for _ in 0..2 {
      login
        .execute(LoginUserCommand {
          email: "all@example.com".to_string(),
          password: "password123".to_string(),
        })
        .await
        .unwrap();
    }

    let use_case = LogoutAllDevicesUseCase::new(ctx.service.clone());
    let response = use_case.execute(registered.user.id).await.unwrap();

    assert_eq!(response.sessions_terminated, 3);
    assert!(ctx.sessions.is_empty().await);
  }

  #[tokio::test]
  async fn test_unknown_user() {
    let ctx = test_context();
    let use_case = LogoutAllDevicesUseCase::new(ctx.service.clone());

    assert!(matches!(
      use_case.execute(Uuid::new_v4()).await,
      Err(AuthError::UserNotFound)
    ));
  }
}
