use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{SessionId, UserRole};

/// User entity representing a user in the system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  /// Unique identifier for the user
  pub id: Uuid,
  /// User's email address (unique, case-sensitive)
  pub email: String,
  /// Hashed password using Argon2id
  pub password_hash: String,
  pub first_name: String,
  pub last_name: String,
  pub role: UserRole,
  /// Inactive users can neither log in nor use existing sessions
  pub is_active: bool,
  /// Whether the user's email has been verified
  pub is_email_verified: bool,
  /// Timestamp of the most recent successful login
  pub last_login_at: Option<DateTime<Utc>>,
  /// SHA-256 digest of the outstanding password reset token
  pub password_reset_token: Option<String>,
  /// Expiration time for password reset token
  pub password_reset_token_expires_at: Option<DateTime<Utc>>,
  /// Timestamp when the user was created
  pub created_at: DateTime<Utc>,
  /// Timestamp when the user was last updated
  pub updated_at: DateTime<Utc>,
}

impl User {
  /// Creates a new, active, unverified user
  pub fn new(
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    role: UserRole,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      email,
      password_hash,
      first_name,
      last_name,
      role,
      is_active: true,
      is_email_verified: false,
      last_login_at: None,
      password_reset_token: None,
      password_reset_token_expires_at: None,
      created_at: now,
      updated_at: now,
    }
  }

  /// Updates the user's password hash
  pub fn update_password(&mut self, new_password_hash: String) {
    self.password_hash = new_password_hash;
    self.updated_at = Utc::now();
  }

  pub fn set_active(&mut self, active: bool) {
    self.is_active = active;
    self.updated_at = Utc::now();
  }

  /// Sets a new password reset token digest with an absolute expiry
  pub fn set_password_reset_token(&mut self, token_hash: String, expires_at: DateTime<Utc>) {
    self.password_reset_token = Some(token_hash);
    self.password_reset_token_expires_at = Some(expires_at);
    self.updated_at = Utc::now();
  }

  /// Checks if the given digest matches the outstanding token and it has not expired
  pub fn is_password_reset_token_valid(&self, token_hash: &str) -> bool {
    match (
      &self.password_reset_token,
      &self.password_reset_token_expires_at,
    ) {
      (Some(stored), Some(expires_at)) => stored == token_hash && expires_at > &Utc::now(),
      _ => false,
    }
  }

  /// Clears the password reset token after successful password reset
  pub fn clear_password_reset_token(&mut self) {
    self.password_reset_token = None;
    self.password_reset_token_expires_at = None;
    self.updated_at = Utc::now();
  }

  pub fn record_login(&mut self, at: DateTime<Utc>) {
    self.last_login_at = Some(at);
    self.updated_at = at;
  }
}

/// Read-only projection of a user that is safe to hand to callers.
///
/// Carries no credential material of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
  pub id: Uuid,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub role: UserRole,
  pub is_active: bool,
  pub is_email_verified: bool,
  /// Creation time as Unix epoch seconds
  pub created_at: i64,
}

impl From<&User> for PublicUser {
  fn from(user: &User) -> Self {
    Self {
      id: user.id,
      email: user.email.clone(),
      first_name: user.first_name.clone(),
      last_name: user.last_name.clone(),
      role: user.role,
      is_active: user.is_active,
      is_email_verified: user.is_email_verified,
      created_at: user.created_at.timestamp(),
    }
  }
}

/// Session entity representing an authentication grant.
///
/// `email` and `role` are a snapshot taken when the session was issued and
/// are only rewritten by an explicit refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub id: SessionId,
  /// Reference to the user who owns this session
  pub user_id: Uuid,
  pub email: String,
  pub role: UserRole,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  /// Issues a session for a user that lives for `duration` from now
  pub fn with_duration(user: &User, duration: Duration) -> Self {
    let now = Utc::now();
    Self {
      id: SessionId::generate(),
      user_id: user.id,
      email: user.email.clone(),
      role: user.role,
      created_at: now,
      expires_at: now + duration,
    }
  }

  /// Checks if the session has expired
  pub fn is_expired(&self) -> bool {
    self.expires_at <= Utc::now()
  }

  /// Replaces the email/role snapshot with the user's current values
  pub fn resnapshot(&mut self, user: &User) {
    self.email = user.email.clone();
    self.role = user.role;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_user() -> User {
    User::new(
      "test@example.com".to_string(),
      "hashed_password".to_string(),
      "Test".to_string(),
      "User".to_string(),
      UserRole::Staff,
    )
  }

  #[test]
  fn test_user_creation() {
    let user = test_user();

    assert_eq!(user.email, "test@example.com");
    assert_eq!(user.first_name, "Test");
    assert!(user.is_active);
    assert!(!user.is_email_verified);
    assert!(user.last_login_at.is_none());
    assert!(user.password_reset_token.is_none());
  }

  #[test]
  fn test_user_password_reset_token() {
    let mut user = test_user();

    user.set_password_reset_token("digest".to_string(), Utc::now() + Duration::hours(1));
    assert!(user.is_password_reset_token_valid("digest"));
    assert!(!user.is_password_reset_token_valid("other"));

    user.clear_password_reset_token();
    assert!(user.password_reset_token.is_none());
    assert!(user.password_reset_token_expires_at.is_none());
  }

  #[test]
  fn test_expired_reset_token_is_invalid() {
    let mut user = test_user();
    user.set_password_reset_token("digest".to_string(), Utc::now() - Duration::seconds(1));
    assert!(!user.is_password_reset_token_valid("digest"));
  }

  #[test]
  fn test_public_user_view() {
    let mut user = test_user();
    user.set_password_reset_token("digest".to_string(), Utc::now() + Duration::hours(1));

    let public = PublicUser::from(&user);
    assert_eq!(public.id, user.id);
    assert_eq!(public.created_at, user.created_at.timestamp());

    let json = serde_json::to_value(&public).unwrap();
    assert!(json.get("password_hash").is_none());
    assert!(json.get("password_reset_token").is_none());
    assert_eq!(json["role"], "staff");
  }

  #[test]
  fn test_session_creation() {
    let user = test_user();
    let session = Session::with_duration(&user, Duration::hours(2));

    assert_eq!(session.user_id, user.id);
    assert_eq!(session.email, user.email);
    assert_eq!(session.role, UserRole::Staff);
    assert!(session.expires_at > session.created_at);
    assert_eq!(session.expires_at - session.created_at, Duration::hours(2));
    assert!(!session.is_expired());
  }

  #[test]
  fn test_session_expiration() {
    let user = test_user();
    let mut session = Session::with_duration(&user, Duration::hours(1));
    session.expires_at = Utc::now() - Duration::seconds(10);

    assert!(session.is_expired());
  }

  #[test]
  fn test_session_resnapshot() {
    let mut user = test_user();
    let mut session = Session::with_duration(&user, Duration::hours(1));

    user.role = UserRole::Admin;
    assert_eq!(session.role, UserRole::Staff);

    session.resnapshot(&user);
    assert_eq!(session.role, UserRole::Admin);
  }
}
