use std::sync::Arc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::{Password, ResetToken};

/// Command for completing a password reset
#[derive(Debug, Clone)]
pub struct ResetPasswordCommand {
  /// Token delivered to the user
  pub token: String,
  pub new_password: String,
}

/// Use case for completing a password reset
pub struct ResetPasswordUseCase {
  auth_service: Arc<AuthService>,
}

impl ResetPasswordUseCase {
  /// Creates a new instance of ResetPasswordUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the reset password use case
  ///
  /// On success the token is spent and every session of the user is revoked.
  ///
  /// # Errors
  /// Returns `AuthError::InvalidOrExpiredResetToken` for a malformed, unknown
  /// or expired token, and `AuthError::WeakPassword` for a short password
  pub async fn execute(&self, command: ResetPasswordCommand) -> Result<(), AuthError> {
    let token = ResetToken::from_string(command.token)
      .map_err(|_| AuthError::InvalidOrExpiredResetToken)?;
    let new_password = Password::new(command.new_password)?;

    self.auth_service.reset_password(token, new_password).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::application::auth::test_support::test_context;

  #[tokio::test]
  async fn test_malformed_token() {
    let ctx = test_context();
    let use_case = ResetPasswordUseCase::new(ctx.service.clone());

    let result = use_case
      .execute(ResetPasswordCommand {
        token: "short".to_string(),
        new_password: "new-password".to_string(),
      })
      .await;

    assert!(matches!(result, Err(AuthError::InvalidOrExpiredResetToken)));
  }

  #[tokio::test]
  async fn test_unknown_token() {
    let ctx = test_context();
    let use_case = ResetPasswordUseCase::new(ctx.service.clone());

    let result = use_case
      .execute(ResetPasswordCommand {
        token: "0f".repeat(32),
        new_password: "new-password".to_string(),
      })
      .await;

    assert!(matches!(result, Err(AuthError::InvalidOrExpiredResetToken)));
  }
}
