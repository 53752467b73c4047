use argon2::password_hash::SaltString;
use argon2::{
  Algorithm, Argon2, Params, Version,
  password_hash::{
    PasswordHash as Argon2PasswordHash, PasswordHasher as Argon2PasswordHasherTrait,
    PasswordVerifier,
  },
};
use async_trait::async_trait;

use crate::domain::auth::errors::HashError;
use crate::domain::auth::ports::PasswordHasher;
use crate::domain::auth::value_objects::{Password, PasswordHash};

/// Argon2id password hasher implementation
///
/// Uses the Argon2id algorithm with:
/// - Memory cost: 19 MiB (19456 KiB)
/// - Time cost: 2 iterations
/// - Parallelism: 1 thread
///
/// One hash costs tens of milliseconds of CPU, so the work is moved onto
/// tokio's blocking pool instead of running on an async worker.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
  argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
  /// Passwords shorter than this are rejected before hashing
  pub const MIN_PASSWORD_LENGTH: usize = 8;

  /// Creates a new Argon2PasswordHasher with the default cost parameters
  pub fn new() -> Result<Self, HashError> {
    Self::with_params(19456, 2, 1)
  }

  /// Creates a hasher with explicit cost parameters
  pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, HashError> {
    let params = Params::new(memory_kib, iterations, parallelism, Some(32)).map_err(|e| {
      HashError::HashingFailed(format!("Failed to create Argon2 params: {}", e))
    })?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    Ok(Self { argon2 })
  }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
  async fn hash(&self, password: &Password) -> Result<PasswordHash, HashError> {
    if password.char_count() < Self::MIN_PASSWORD_LENGTH {
      return Err(HashError::WeakPassword {
        min: Self::MIN_PASSWORD_LENGTH,
      });
    }

    let argon2 = self.argon2.clone();
    let password = password.clone();

    tokio::task::spawn_blocking(move || -> Result<PasswordHash, HashError> {
      let salt = SaltString::generate(&mut rand::rngs::OsRng);
      let hash = argon2.hash_password(password.as_str().as_bytes(), &salt)?;
      Ok(PasswordHash::from_hash(hash.to_string()))
    })
    .await
    .map_err(|e| HashError::HashingFailed(format!("Hashing task failed: {}", e)))?
  }

  /// Verifies a password using argon2's constant-time comparison
  async fn verify(&self, password: &Password, hashed_password: &PasswordHash) -> bool {
    let argon2 = self.argon2.clone();
    let password = password.clone();
    let hashed_password = hashed_password.clone();

    let outcome = tokio::task::spawn_blocking(move || -> Result<(), argon2::password_hash::Error> {
      let parsed_hash = Argon2PasswordHash::new(hashed_password.as_str())?;
      argon2.verify_password(password.as_str().as_bytes(), &parsed_hash)
    })
    .await;

    match outcome {
      Ok(Ok(())) => true,
      Ok(Err(argon2::password_hash::Error::Password)) => false,
      Ok(Err(e)) => {
        tracing::warn!(error = %e, "Stored password hash could not be used for verification");
        false
      }
      Err(e) => {
        tracing::error!(error = %e, "Password verification task failed");
        false
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_hash_password() {
    let hasher = Argon2PasswordHasher::new().unwrap();
    let password = Password::new("test_password_123").unwrap();

    let hash = hasher.hash(&password).await.unwrap();
    assert!(hash.as_str().starts_with("$argon2id$"));
  }

  #[tokio::test]
  async fn test_rejects_short_password() {
    let hasher = Argon2PasswordHasher::new().unwrap();
    let password = Password::new("1234567").unwrap();

    let result = hasher.hash(&password).await;
    assert!(matches!(result, Err(HashError::WeakPassword { min: 8 })));

    let password = Password::new("12345678").unwrap();
    assert!(hasher.hash(&password).await.is_ok());
  }

  #[tokio::test]
  async fn test_verify_correct_and_incorrect_password() {
    let hasher = Argon2PasswordHasher::new().unwrap();
    let password = Password::new("test_password_123").unwrap();
    let wrong_password = Password::new("wrong_password").unwrap();

    let hash = hasher.hash(&password).await.unwrap();

    assert!(hasher.verify(&password, &hash).await);
    assert!(!hasher.verify(&wrong_password, &hash).await);
  }

  #[tokio::test]
  async fn test_hash_produces_different_salts() {
    let hasher = Argon2PasswordHasher::new().unwrap();
    let password = Password::new("test_password_123").unwrap();

    let hash1 = hasher.hash(&password).await.unwrap();
    let hash2 = hasher.hash(&password).await.unwrap();

    // Same password should produce different hashes due to random salt
    assert_ne!(hash1.as_str(), hash2.as_str());

    assert!(hasher.verify(&password, &hash1).await);
    assert!(hasher.verify(&password, &hash2).await);
  }

  #[tokio::test]
  async fn test_verify_malformed_hash_is_false() {
    let hasher = Argon2PasswordHasher::new().unwrap();
    let password = Password::new("test_password_123").unwrap();

    assert!(!hasher.verify(&password, &PasswordHash::from_hash("invalid_hash")).await);
    assert!(!hasher.verify(&password, &PasswordHash::from_hash("")).await);
  }

  #[tokio::test]
  async fn test_argon2_parameters() {
    let hasher = Argon2PasswordHasher::new().unwrap();
    let password = Password::new("test_password_123").unwrap();

    let hash = hasher.hash(&password).await.unwrap();
    let parsed = Argon2PasswordHash::new(hash.as_str()).unwrap();

    assert_eq!(parsed.version, Some(Version::V0x13 as u32));
    assert!(hash.as_str().contains("m=19456,t=2,p=1"));
  }
}
