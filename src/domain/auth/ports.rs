use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::{Session, User};
use super::errors::{HashError, RepositoryError, TokenError};
use super::value_objects::{Email, Password, PasswordHash, ResetToken, SessionId, TokenHash, UserRole};

/// Repository trait for durable user records
///
/// Implementations own the timestamps: `created_at` is set on insert and
/// `updated_at` on every mutation, whatever the caller passed in.
#[async_trait]
pub trait UserRepository: Send + Sync {
  /// Inserts a new user. Fails with `DuplicateKey` if the email is taken;
  /// the check must be atomic with the insert.
  async fn create(&self, user: User) -> Result<User, RepositoryError>;

  async fn get_by_id(&self, id: Uuid) -> Result<User, RepositoryError>;

  async fn get_by_email(&self, email: &Email) -> Result<User, RepositoryError>;

  /// Writes profile, credential and activation fields. Reset-token fields and
  /// last-login are left untouched.
  async fn update(&self, user: &User) -> Result<User, RepositoryError>;

  async fn update_last_login(&self, id: Uuid) -> Result<(), RepositoryError>;

  async fn set_reset_token(
    &self,
    email: &Email,
    token_hash: &TokenHash,
    expires_at: DateTime<Utc>,
  ) -> Result<(), RepositoryError>;

  /// Finds the user holding this token digest, but only while the stored
  /// expiry is strictly in the future.
  async fn get_by_reset_token(&self, token_hash: &TokenHash) -> Result<User, RepositoryError>;

  async fn clear_reset_token(&self, id: Uuid) -> Result<(), RepositoryError>;
}

/// Repository trait for volatile, self-expiring sessions
#[async_trait]
pub trait SessionRepository: Send + Sync {
  /// Stores the session with a TTL derived from `expires_at` and indexes it
  /// under its owner.
  async fn create(&self, session: &Session) -> Result<(), RepositoryError>;

  /// Fails with `NotFound` when absent, and with `Expired` (after removing the
  /// entry) when the embedded expiry has passed.
  async fn get(&self, id: &SessionId) -> Result<Session, RepositoryError>;

  /// Idempotent: deleting an absent session succeeds
  async fn delete(&self, id: &SessionId) -> Result<(), RepositoryError>;

  /// Deletes every indexed session of a user and the index itself, returning
  /// the number of sessions removed
  async fn delete_all_for_user(&self, user_id: Uuid) -> Result<usize, RepositoryError>;

  /// Rewrites an existing session and resets its residual TTL
  async fn update(&self, session: &Session) -> Result<(), RepositoryError>;
}

/// Service trait for password hashing operations
#[async_trait]
pub trait PasswordHasher: Send + Sync {
  /// Hashes a plain text password, rejecting passwords below the minimum length
  async fn hash(&self, password: &Password) -> Result<PasswordHash, HashError>;

  /// Verifies a plain text password against a stored hash. Never errors:
  /// a mismatch or an unreadable hash is simply `false`.
  async fn verify(&self, password: &Password, hashed_password: &PasswordHash) -> bool;
}

/// Service trait for secure token generation
#[async_trait]
pub trait TokenGenerator: Send + Sync {
  /// Draws `byte_length` bytes from a secure source, as lowercase hex
  async fn generate(&self, byte_length: usize) -> Result<String, TokenError>;
}

/// Claims carried by the stateless bearer credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerClaims {
  /// User id
  pub sub: Uuid,
  pub email: String,
  pub role: UserRole,
  pub iat: i64,
  pub exp: i64,
}

/// A signed bearer credential and its absolute expiry
#[derive(Debug, Clone)]
pub struct BearerToken {
  pub token: String,
  pub expires_at: DateTime<Utc>,
}

/// Issues and verifies the stateless bearer credential
pub trait BearerTokenIssuer: Send + Sync {
  fn issue(&self, user: &User) -> Result<BearerToken, TokenError>;

  fn verify(&self, token: &str) -> Result<BearerClaims, TokenError>;
}

/// Delivery channel for password reset tokens (email, SMS, ...)
#[async_trait]
pub trait PasswordResetNotifier: Send + Sync {
  async fn send_reset_token(
    &self,
    email: &Email,
    token: &ResetToken,
    expires_at: DateTime<Utc>,
  ) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotificationError(pub String);
