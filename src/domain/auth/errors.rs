use thiserror::Error;

use super::value_objects::ValueObjectError;

/// Main authentication error type
#[derive(Debug, Error)]
pub enum AuthError {
  #[error("Invalid credentials provided")]
  InvalidCredentials,

  #[error("Email already exists")]
  EmailAlreadyExists,

  #[error("Invalid role: {0}")]
  InvalidRole(String),

  #[error("Password too weak, minimum {min} characters required")]
  WeakPassword { min: usize },

  #[error("Account is deactivated")]
  AccountDeactivated,

  #[error("User not found")]
  UserNotFound,

  #[error("Session not found")]
  SessionNotFound,

  #[error("Session expired")]
  SessionExpired,

  #[error("Invalid or expired reset token")]
  InvalidOrExpiredResetToken,

  #[error("Invalid or expired bearer token")]
  InvalidBearerToken,

  #[error("Validation error: {0}")]
  Validation(#[from] ValidationError),

  #[error("Value object error: {0}")]
  ValueObject(#[from] ValueObjectError),

  #[error("{operation}: repository error: {source}")]
  Repository {
    operation: &'static str,
    #[source]
    source: RepositoryError,
  },

  #[error("{operation}: hash error: {source}")]
  Hash {
    operation: &'static str,
    #[source]
    source: HashError,
  },

  #[error("{operation}: token error: {source}")]
  Token {
    operation: &'static str,
    #[source]
    source: TokenError,
  },
}

impl AuthError {
  pub fn repository(operation: &'static str, source: RepositoryError) -> Self {
    AuthError::Repository { operation, source }
  }

  /// Maps a hasher failure, lifting `WeakPassword` into the domain taxonomy
  pub fn hash(operation: &'static str, source: HashError) -> Self {
    match source {
      HashError::WeakPassword { min } => AuthError::WeakPassword { min },
      source => AuthError::Hash { operation, source },
    }
  }

  pub fn token(operation: &'static str, source: TokenError) -> Self {
    AuthError::Token { operation, source }
  }

  /// True for infrastructure failures that callers should see as internal errors
  pub fn is_internal(&self) -> bool {
    matches!(
      self,
      AuthError::Repository { .. } | AuthError::Hash { .. } | AuthError::Token { .. }
    )
  }
}

/// Repository-related errors
#[derive(Debug, Error)]
pub enum RepositoryError {
  #[error("Connection failed: {0}")]
  ConnectionFailed(String),

  #[error("Query execution failed: {0}")]
  QueryFailed(String),

  #[error("Record not found")]
  NotFound,

  #[error("Record expired")]
  Expired,

  #[error("Duplicate key violation: {0}")]
  DuplicateKey(String),

  #[error("Serialization failed: {0}")]
  Serialization(String),

  #[error("Database error: {0}")]
  DatabaseError(String),
}

/// Password hashing errors
#[derive(Debug, Error)]
pub enum HashError {
  #[error("Password too short, minimum {min} characters required")]
  WeakPassword { min: usize },

  #[error("Failed to hash password: {0}")]
  HashingFailed(String),

  #[error("Invalid hash format")]
  InvalidFormat,
}

/// Random token and bearer credential errors
#[derive(Debug, Error)]
pub enum TokenError {
  #[error("Secure random source failed: {0}")]
  RandomSourceFailure(String),

  #[error("Failed to sign bearer token: {0}")]
  SigningFailed(String),

  #[error("Bearer token is invalid")]
  InvalidBearer,

  #[error("Bearer token has expired")]
  ExpiredBearer,
}

/// Input validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
  #[error("Invalid field: {field}")]
  InvalidField { field: String },

  #[error("Missing required field: {field}")]
  MissingField { field: String },
}

// Automatic conversions from external error types

impl From<sqlx::Error> for RepositoryError {
  fn from(error: sqlx::Error) -> Self {
    match error {
      sqlx::Error::RowNotFound => RepositoryError::NotFound,
      sqlx::Error::Database(db_err) => {
        if db_err.is_unique_violation() {
          RepositoryError::DuplicateKey(db_err.message().to_string())
        } else {
          RepositoryError::DatabaseError(db_err.message().to_string())
        }
      }
      sqlx::Error::PoolTimedOut => RepositoryError::ConnectionFailed("Pool timed out".to_string()),
      sqlx::Error::PoolClosed => RepositoryError::ConnectionFailed("Pool closed".to_string()),
      _ => RepositoryError::QueryFailed(error.to_string()),
    }
  }
}

impl From<redis::RedisError> for RepositoryError {
  fn from(error: redis::RedisError) -> Self {
    if error.is_connection_refusal() || error.is_connection_dropped() || error.is_timeout() {
      RepositoryError::ConnectionFailed(error.to_string())
    } else {
      RepositoryError::QueryFailed(error.to_string())
    }
  }
}

impl From<serde_json::Error> for RepositoryError {
  fn from(error: serde_json::Error) -> Self {
    RepositoryError::Serialization(error.to_string())
  }
}

impl From<argon2::password_hash::Error> for HashError {
  fn from(error: argon2::password_hash::Error) -> Self {
    use argon2::password_hash::Error;
    match error {
      Error::PhcStringField | Error::PhcStringTrailingData => HashError::InvalidFormat,
      _ => HashError::HashingFailed(error.to_string()),
    }
  }
}
