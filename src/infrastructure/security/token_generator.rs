use async_trait::async_trait;
use rand::RngCore;

use crate::domain::auth::errors::TokenError;
use crate::domain::auth::ports::TokenGenerator;

/// Secure token generator backed by the operating system's CSPRNG
pub struct SecureTokenGenerator;

impl SecureTokenGenerator {
  pub fn new() -> Self {
    Self
  }
}

impl Default for SecureTokenGenerator {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl TokenGenerator for SecureTokenGenerator {
  /// Generates `byte_length` random bytes from `OsRng` and encodes them as
  /// lowercase hex, so the result is always `2 * byte_length` characters.
  ///
  /// # Errors
  /// Returns `TokenError::RandomSourceFailure` if the OS random source fails.
  /// No fallback source is ever used.
  async fn generate(&self, byte_length: usize) -> Result<String, TokenError> {
    let mut token_bytes = vec![0u8; byte_length];

    rand::rngs::OsRng
      .try_fill_bytes(&mut token_bytes)
      .map_err(|e| TokenError::RandomSourceFailure(e.to_string()))?;

    Ok(hex::encode(token_bytes))
  }
}
