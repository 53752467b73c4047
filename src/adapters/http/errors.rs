use actix_web::{
  HttpResponse,
  error::ResponseError,
  http::{StatusCode, header::ContentType},
};
use serde::Serialize;
use std::fmt;

use crate::domain::auth::errors::AuthError;

/// Standard error response body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
  /// Error type/code
  pub error: String,

  /// Human-readable error message
  pub message: String,
}

/// API error type that maps domain errors to HTTP responses
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum ApiError {
  /// Validation error (400 Bad Request)
  Validation(String),

  /// Authentication error (401, 403, 404 or 409)
  Auth(AuthErrorKind),

  /// Internal server error (500 Internal Server Error)
  Internal(String),
}

/// Authentication error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthErrorKind {
  /// Invalid credentials (401)
  InvalidCredentials,

  /// Session unknown or missing (401)
  InvalidSession,

  /// Session past its expiry (401)
  SessionExpired,

  /// Reset token or bearer credential rejected (401)
  InvalidToken,

  /// Email already exists (409)
  EmailAlreadyExists,

  /// User not found (404)
  UserNotFound,

  /// Account deactivated (403)
  AccountDeactivated,

  /// Authenticated, but the role is not allowed here (403)
  InsufficientRole,
}

impl AuthErrorKind {
  fn code_and_message(self) -> (&'static str, &'static str) {
    match self {
      AuthErrorKind::InvalidCredentials => ("invalid_credentials", "Invalid email or password"),
      AuthErrorKind::InvalidSession => ("invalid_session", "Invalid or missing session"),
      AuthErrorKind::SessionExpired => ("session_expired", "Session has expired"),
      AuthErrorKind::InvalidToken => ("invalid_token", "Invalid or expired token"),
      AuthErrorKind::EmailAlreadyExists => (
        "email_already_exists",
        "An account with this email already exists",
      ),
      AuthErrorKind::UserNotFound => ("user_not_found", "User not found"),
      AuthErrorKind::AccountDeactivated => ("account_deactivated", "This account is deactivated"),
      AuthErrorKind::InsufficientRole => ("insufficient_role", "Insufficient permissions"),
    }
  }
}

impl ApiError {
  pub fn is_internal(&self) -> bool {
    matches!(self, ApiError::Internal(_))
  }

  /// JSON body for this error. Internal details are logged, never returned.
  pub fn body(&self) -> ErrorResponse {
    let (error_type, message) = match self {
      ApiError::Validation(msg) => ("validation_error", msg.clone()),
      ApiError::Auth(kind) => {
        let (code, message) = kind.code_and_message();
        (code, message.to_string())
      }
      ApiError::Internal(msg) => {
        tracing::error!("Internal error: {}", msg);
        (
          "internal_error",
          "An internal server error occurred".to_string(),
        )
      }
    };

    ErrorResponse {
      error: error_type.to_string(),
      message,
    }
  }
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
      ApiError::Auth(kind) => write!(f, "Authentication error: {:?}", kind),
      ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
    }
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::Auth(kind) => match kind {
        AuthErrorKind::InvalidCredentials
        | AuthErrorKind::InvalidSession
        | AuthErrorKind::SessionExpired
        | AuthErrorKind::InvalidToken => StatusCode::UNAUTHORIZED,
        AuthErrorKind::EmailAlreadyExists => StatusCode::CONFLICT,
        AuthErrorKind::UserNotFound => StatusCode::NOT_FOUND,
        AuthErrorKind::AccountDeactivated | AuthErrorKind::InsufficientRole => {
          StatusCode::FORBIDDEN
        }
      },
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    HttpResponse::build(self.status_code())
      .content_type(ContentType::json())
      .json(self.body())
  }
}

/// Convert AuthError to ApiError
impl From<AuthError> for ApiError {
  fn from(error: AuthError) -> Self {
    match error {
      AuthError::InvalidCredentials => ApiError::Auth(AuthErrorKind::InvalidCredentials),
      AuthError::EmailAlreadyExists => ApiError::Auth(AuthErrorKind::EmailAlreadyExists),
      AuthError::UserNotFound => ApiError::Auth(AuthErrorKind::UserNotFound),
      AuthError::AccountDeactivated => ApiError::Auth(AuthErrorKind::AccountDeactivated),
      AuthError::SessionNotFound => ApiError::Auth(AuthErrorKind::InvalidSession),
      AuthError::SessionExpired => ApiError::Auth(AuthErrorKind::SessionExpired),
      AuthError::InvalidOrExpiredResetToken | AuthError::InvalidBearerToken => {
        ApiError::Auth(AuthErrorKind::InvalidToken)
      }
      err @ (AuthError::InvalidRole(_) | AuthError::WeakPassword { .. }) => {
        ApiError::Validation(err.to_string())
      }
      AuthError::Validation(err) => ApiError::Validation(err.to_string()),
      AuthError::ValueObject(err) => ApiError::Validation(err.to_string()),
      err @ (AuthError::Repository { .. } | AuthError::Hash { .. } | AuthError::Token { .. }) => {
        ApiError::Internal(err.to_string())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::auth::errors::{RepositoryError, ValidationError};
  use crate::domain::auth::value_objects::ValueObjectError;

  fn status_of(error: AuthError) -> StatusCode {
    ApiError::from(error).status_code()
  }

  #[test]
  fn test_api_error_status_codes() {
    assert_eq!(
      ApiError::Validation("test".to_string()).status_code(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      ApiError::Auth(AuthErrorKind::InvalidCredentials).status_code(),
      StatusCode::UNAUTHORIZED
    );
    assert_eq!(
      ApiError::Auth(AuthErrorKind::EmailAlreadyExists).status_code(),
      StatusCode::CONFLICT
    );
    assert_eq!(
      ApiError::Auth(AuthErrorKind::InsufficientRole).status_code(),
      StatusCode::FORBIDDEN
    );
    assert_eq!(
      ApiError::Internal("test".to_string()).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn test_auth_error_conversion() {
    assert_eq!(status_of(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(AuthError::SessionNotFound), StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(AuthError::SessionExpired), StatusCode::UNAUTHORIZED);
    assert_eq!(
      status_of(AuthError::InvalidOrExpiredResetToken),
      StatusCode::UNAUTHORIZED
    );
    assert_eq!(status_of(AuthError::InvalidBearerToken), StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(AuthError::AccountDeactivated), StatusCode::FORBIDDEN);
    assert_eq!(status_of(AuthError::UserNotFound), StatusCode::NOT_FOUND);
    assert_eq!(status_of(AuthError::EmailAlreadyExists), StatusCode::CONFLICT);
  }

  #[test]
  fn test_input_errors_are_bad_requests() {
    assert_eq!(
      status_of(AuthError::WeakPassword { min: 8 }),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      status_of(AuthError::InvalidRole("root".to_string())),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      status_of(AuthError::Validation(ValidationError::MissingField {
        field: "first_name".to_string()
      })),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      status_of(AuthError::ValueObject(ValueObjectError::EmptyPassword)),
      StatusCode::BAD_REQUEST
    );
  }

  #[test]
  fn test_internal_details_are_hidden() {
    let error = ApiError::from(AuthError::repository(
      "login",
      RepositoryError::ConnectionFailed("10.0.0.5:5432 refused".to_string()),
    ));

    assert!(error.is_internal());
    let body = error.body();
    assert_eq!(body.error, "internal_error");
    assert!(!body.message.contains("10.0.0.5"));
  }
}
