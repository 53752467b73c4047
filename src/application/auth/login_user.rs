use std::sync::Arc;

use crate::domain::auth::entities::PublicUser;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::{Email, Password};

/// Command for logging in a user
#[derive(Debug, Clone)]
pub struct LoginUserCommand {
  /// User's email address
  pub email: String,
  /// User's password (plain text)
  pub password: String,
}

/// Response after successful user login
#[derive(Debug, Clone)]
pub struct LoginUserResponse {
  pub user: PublicUser,
  /// Id of the newly opened session
  pub session_id: String,
  /// Session expiry as Unix epoch seconds
  pub session_expires_at: i64,
  /// Signed bearer credential
  pub token: String,
  /// Bearer expiry as Unix epoch seconds
  pub token_expires_at: i64,
}

/// Use case for logging in a user
pub struct LoginUserUseCase {
  auth_service: Arc<AuthService>,
}

impl LoginUserUseCase {
  /// Creates a new instance of LoginUserUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the user login use case
  ///
  /// Every successful login opens a new session; existing sessions of the
  /// same user are left alone.
  ///
  /// # Errors
  /// Returns `AuthError` if login fails (e.g., invalid credentials, deactivated account)
  pub async fn execute(&self, command: LoginUserCommand) -> Result<LoginUserResponse, AuthError> {
    let email = Email::new(command.email)?;
    let password = Password::new(command.password)?;

    let outcome = self.auth_service.login(email, password).await?;

    Ok(LoginUserResponse {
      user: PublicUser::from(&outcome.user),
      session_id: outcome.session.id.into_inner(),
      session_expires_at: outcome.session.expires_at.timestamp(),
      token: outcome.bearer.token,
      token_expires_at: outcome.bearer.expires_at.timestamp(),
    })
  }
}
