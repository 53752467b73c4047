use std::sync::Arc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::Email;

/// Command for starting a password reset
#[derive(Debug, Clone)]
pub struct RequestPasswordResetCommand {
  pub email: String,
}

/// Use case for issuing a password reset token
pub struct RequestPasswordResetUseCase {
  auth_service: Arc<AuthService>,
}

impl RequestPasswordResetUseCase {
  /// Creates a new instance of RequestPasswordResetUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the request password reset use case
  ///
  /// The outcome is the same whether or not the email is registered. The
  /// token itself only ever travels through the configured notifier.
  ///
  /// # Errors
  /// Returns `AuthError` for a malformed email or a store failure
  pub async fn execute(&self, command: RequestPasswordResetCommand) -> Result<(), AuthError> {
    let email = Email::new(command.email)?;

    self.auth_service.request_password_reset(email).await
  }
}
