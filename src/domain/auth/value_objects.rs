use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidateEmail;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ValueObjectError {
  #[error("Invalid email format: {0}")]
  InvalidEmail(String),

  #[error("Password must not be empty")]
  EmptyPassword,

  #[error("Password is too long (maximum 128 characters)")]
  PasswordTooLong,

  #[error("Invalid token format")]
  InvalidToken,

  #[error("Session identifier must not be empty")]
  EmptySessionId,

  #[error("Unknown role: {0}")]
  UnknownRole(String),
}

// ============================================================================
// Email Value Object
// ============================================================================

/// A syntactically valid email address.
///
/// Emails are compared exactly as stored: no case folding is applied, so
/// `Alice@example.com` and `alice@example.com` are two distinct accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
  /// Creates a new Email after validation
  pub fn new(email: impl Into<String>) -> Result<Self, ValueObjectError> {
    let email = email.into();
    let trimmed = email.trim();

    if !trimmed.validate_email() {
      return Err(ValueObjectError::InvalidEmail(email));
    }

    Ok(Self(trimmed.to_string()))
  }

  /// Returns the email as a string slice
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Consumes self and returns the inner String
  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for Email {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl AsRef<str> for Email {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

// ============================================================================
// Password Value Object (Plain Password - Never Stored)
// ============================================================================

/// A plain-text password as supplied by a caller.
///
/// Only shape is checked here. The strength rule (minimum length) belongs to
/// the hasher, so that a short password presented at login is reported as
/// invalid credentials rather than as a weak password.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
  pub const MAX_LENGTH: usize = 128;

  /// Creates a new Password after validation
  pub fn new(password: impl Into<String>) -> Result<Self, ValueObjectError> {
    let password = password.into();

    if password.is_empty() {
      return Err(ValueObjectError::EmptyPassword);
    }

    if password.chars().count() > Self::MAX_LENGTH {
      return Err(ValueObjectError::PasswordTooLong);
    }

    Ok(Self(password))
  }

  /// Number of characters (Unicode scalar values) in the password
  pub fn char_count(&self) -> usize {
    self.0.chars().count()
  }

  /// Returns the password as a string slice (use with caution)
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for Password {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Password(***)")
  }
}

impl fmt::Display for Password {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("***")
  }
}

// ============================================================================
// PasswordHash Value Object (Argon2id PHC string)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
  /// Wraps a hash string produced by the hasher or read back from a store.
  ///
  /// The format is not checked here: a corrupt stored hash must make
  /// verification fail, not make the user record unreadable.
  pub fn from_hash(hash: impl Into<String>) -> Self {
    Self(hash.into())
  }

  /// Returns the hash as a string slice
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Consumes self and returns the inner String
  pub fn into_inner(self) -> String {
    self.0
  }
}

// ============================================================================
// ResetToken Value Object (Random Secure Token sent to the user)
// ============================================================================

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ResetToken(String);

impl ResetToken {
  pub const BYTE_LENGTH: usize = 32; // 32 bytes = 256 bits

  /// Wraps a freshly generated hex token
  pub(crate) fn from_generated(token: String) -> Self {
    Self(token)
  }

  /// Creates a ResetToken from a string presented by a caller
  pub fn from_string(token: impl Into<String>) -> Result<Self, ValueObjectError> {
    let token = token.into();
    let token = token.trim();

    if token.len() != Self::BYTE_LENGTH * 2 || !token.chars().all(|c| c.is_ascii_hexdigit()) {
      return Err(ValueObjectError::InvalidToken);
    }

    Ok(Self(token.to_ascii_lowercase()))
  }

  /// Creates a hash of this token for storage
  pub fn hash(&self) -> TokenHash {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(self.0.as_bytes());
    let result = hasher.finalize();

    TokenHash(hex::encode(result))
  }

  /// Returns the token as a string slice (use with caution)
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for ResetToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("ResetToken(***)")
  }
}

impl fmt::Display for ResetToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("***")
  }
}

// ============================================================================
// TokenHash Value Object (SHA-256 Hash of a ResetToken)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenHash(String);

impl TokenHash {
  /// Creates a TokenHash from an existing hash string
  pub fn from_hash(hash: impl Into<String>) -> Result<Self, ValueObjectError> {
    let hash = hash.into();

    // SHA-256 produces 64 hex characters
    if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
      return Err(ValueObjectError::InvalidToken);
    }

    Ok(Self(hash))
  }

  /// Returns the hash as a string slice
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Consumes self and returns the inner String
  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for TokenHash {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ============================================================================
// SessionId Value Object
// ============================================================================

/// Opaque, unguessable session handle.
///
/// Generated from a random UUID, but callers only ever see and present the
/// string form, so any string read from a request is accepted and simply
/// fails lookup if it names nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
  /// Creates a new random SessionId
  pub fn generate() -> Self {
    Self(Uuid::new_v4().to_string())
  }

  /// Creates a SessionId from a string extracted from a request
  pub fn from_string(id: impl Into<String>) -> Result<Self, ValueObjectError> {
    let id = id.into();
    let id = id.trim();

    if id.is_empty() {
      return Err(ValueObjectError::EmptySessionId);
    }

    Ok(Self(id.to_string()))
  }

  /// Returns the id as a string slice
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Consumes self and returns the inner String
  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for SessionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ============================================================================
// UserRole Enum
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
  Admin,
  Therapist,
  Staff,
}

impl UserRole {
  /// Canonical lowercase name, as stored and serialized
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Therapist => "therapist",
      Self::Staff => "staff",
    }
  }
}

impl FromStr for UserRole {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "admin" => Ok(Self::Admin),
      "therapist" => Ok(Self::Therapist),
      "staff" => Ok(Self::Staff),
      other => Err(ValueObjectError::UnknownRole(other.to_string())),
    }
  }
}

impl fmt::Display for UserRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_email_validation() {
    // Valid emails
    assert!(Email::new("test@example.com").is_ok());
    assert!(Email::new("user.name@domain.co.uk").is_ok());

    // Invalid emails
    assert!(Email::new("invalid").is_err());
    assert!(Email::new("@example.com").is_err());
    assert!(Email::new("test@").is_err());
  }

  #[test]
  fn test_email_is_case_sensitive_as_stored() {
    let email = Email::new("Test@Example.COM").unwrap();
    assert_eq!(email.as_str(), "Test@Example.COM");
    assert_ne!(email, Email::new("test@example.com").unwrap());
  }

  #[test]
  fn test_password_shape() {
    assert!(Password::new("short").is_ok());
    assert!(matches!(
      Password::new(""),
      Err(ValueObjectError::EmptyPassword)
    ));
    assert!(matches!(
      Password::new("a".repeat(129)),
      Err(ValueObjectError::PasswordTooLong)
    ));
  }

  #[test]
  fn test_password_counts_characters_not_bytes() {
    let password = Password::new("ééééééé").unwrap();
    assert_eq!(password.char_count(), 7);
  }

  #[test]
  fn test_secrets_are_redacted() {
    let password = Password::new("supersecret").unwrap();
    assert_eq!(format!("{:?}", password), "Password(***)");

    let token = ResetToken::from_string("ab".repeat(32)).unwrap();
    assert_eq!(format!("{}", token), "***");
  }

  #[test]
  fn test_reset_token_parsing() {
    assert!(ResetToken::from_string("ab".repeat(32)).is_ok());
    assert!(ResetToken::from_string("ab".repeat(16)).is_err());
    assert!(ResetToken::from_string("zz".repeat(32)).is_err());

    let upper = ResetToken::from_string("AB".repeat(32)).unwrap();
    assert_eq!(upper.as_str(), "ab".repeat(32));
  }

  #[test]
  fn test_reset_token_hash_is_stable() {
    let token = ResetToken::from_string("0f".repeat(32)).unwrap();
    let same = ResetToken::from_string("0f".repeat(32)).unwrap();
    let other = ResetToken::from_string("f0".repeat(32)).unwrap();

    assert_eq!(token.hash(), same.hash());
    assert_ne!(token.hash(), other.hash());
    assert!(TokenHash::from_hash(token.hash().into_inner()).is_ok());
  }

  #[test]
  fn test_session_id() {
    let a = SessionId::generate();
    let b = SessionId::generate();
    assert_ne!(a, b);

    assert!(matches!(
      SessionId::from_string("   "),
      Err(ValueObjectError::EmptySessionId)
    ));
    assert_eq!(SessionId::from_string(" abc ").unwrap().as_str(), "abc");
  }

  #[test]
  fn test_role_parsing() {
    assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
    assert_eq!("therapist".parse::<UserRole>().unwrap(), UserRole::Therapist);
    assert_eq!("staff".parse::<UserRole>().unwrap(), UserRole::Staff);
    assert!("Admin".parse::<UserRole>().is_err());
    assert!("owner".parse::<UserRole>().is_err());
  }

  #[test]
  fn test_role_serializes_lowercase() {
    let json = serde_json::to_string(&UserRole::Therapist).unwrap();
    assert_eq!(json, "\"therapist\"");
  }
}
