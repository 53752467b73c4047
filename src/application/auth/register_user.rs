use std::sync::Arc;

use crate::domain::auth::entities::PublicUser;
use crate::domain::auth::errors::{AuthError, ValidationError};
use crate::domain::auth::services::{AuthService, NewUser};
use crate::domain::auth::value_objects::{Email, Password, UserRole};

/// Command for registering a new user
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
  /// User's email address
  pub email: String,
  /// User's password (plain text, will be hashed)
  pub password: String,
  pub first_name: String,
  pub last_name: String,
  /// One of `admin`, `therapist`, `staff`
  pub role: String,
}

/// Response after successful user registration
#[derive(Debug, Clone)]
pub struct RegisterUserResponse {
  pub user: PublicUser,
  /// Session id for immediate use
  pub session_id: String,
  /// Session expiry as Unix epoch seconds
  pub session_expires_at: i64,
  /// Signed bearer credential
  pub token: String,
  /// Bearer expiry as Unix epoch seconds
  pub token_expires_at: i64,
}

/// Use case for registering a new user
pub struct RegisterUserUseCase {
  auth_service: Arc<AuthService>,
}

impl RegisterUserUseCase {
  /// Creates a new instance of RegisterUserUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the user registration use case
  ///
  /// # Errors
  /// Returns `AuthError` if registration fails (e.g., email already exists,
  /// unknown role, password too short, missing name)
  pub async fn execute(
    &self,
    command: RegisterUserCommand,
  ) -> Result<RegisterUserResponse, AuthError> {
    let email = Email::new(command.email)?;
    let password = Password::new(command.password)?;
    let first_name = required("first_name", command.first_name)?;
    let last_name = required("last_name", command.last_name)?;

    let role = command
      .role
      .parse::<UserRole>()
      .map_err(|_| AuthError::InvalidRole(command.role.clone()))?;

    let outcome = self
      .auth_service
      .register(NewUser {
        email,
        password,
        first_name,
        last_name,
        role,
      })
      .await?;

    Ok(RegisterUserResponse {
      user: PublicUser::from(&outcome.user),
      session_id: outcome.session.id.into_inner(),
      session_expires_at: outcome.session.expires_at.timestamp(),
      token: outcome.bearer.token,
      token_expires_at: outcome.bearer.expires_at.timestamp(),
    })
  }
}

fn required(field: &str, value: String) -> Result<String, ValidationError> {
  let value = value.trim();
  if value.is_empty() {
    return Err(ValidationError::MissingField {
      field: field.to_string(),
    });
  }
  Ok(value.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::application::auth::test_support::test_context;

  fn command(email: &str, role: &str) -> RegisterUserCommand {
    RegisterUserCommand {
      email: email.to_string(),
      password: "password123".to_string(),
      first_name: "Ada".to_string(),
      last_name: "Lovelace".to_string(),
      role: role.to_string(),
    }
  }

  #[tokio::test]
  async fn test_register_returns_public_user_and_credentials() {
    let ctx = test_context();
    let use_case = RegisterUserUseCase::new(ctx.service.clone());

    let response = use_case
      .execute(command("ada@example.com", "therapist"))
      .await
      .unwrap();

    assert_eq!(response.user.email, "ada@example.com");
    assert_eq!(response.user.role, UserRole::Therapist);
    assert!(response.user.is_active);
    assert!(!response.session_id.is_empty());
    assert!(!response.token.is_empty());
    assert!(response.session_expires_at > response.user.created_at);
  }

  #[tokio::test]
  async fn test_unknown_role_is_rejected() {
    let ctx = test_context();
    let use_case = RegisterUserUseCase::new(ctx.service.clone());

    let result = use_case.execute(command("role@example.com", "Admin")).await;

    assert!(matches!(result, Err(AuthError::InvalidRole(role)) if role == "Admin"));
    assert!(ctx.users.is_empty().await);
  }

  #[tokio::test]
  async fn test_missing_name_is_rejected() {
    let ctx = test_context();
    let use_case = RegisterUserUseCase::new(ctx.service.clone());

    let mut cmd = command("name@example.com", "staff");
    cmd.last_name = "  ".to_string();

    assert!(matches!(
      use_case.execute(cmd).await,
      Err(AuthError::Validation(ValidationError::MissingField { field })) if field == "last_name"
    ));
  }

  #[tokio::test]
  async fn test_invalid_email_is_rejected() {
    let ctx = test_context();
    let use_case = RegisterUserUseCase::new(ctx.service.clone());

    assert!(matches!(
      use_case.execute(command("not-an-email", "staff")).await,
      Err(AuthError::ValueObject(_))
    ));
  }
}
