use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};

use crate::domain::auth::entities::User;
use crate::domain::auth::errors::TokenError;
use crate::domain::auth::ports::{BearerClaims, BearerToken, BearerTokenIssuer};
use crate::infrastructure::config::SecurityConfig;

/// HS256-signed bearer credentials
///
/// The bearer is an alternative stateless credential. It is never consulted
/// when validating a session.
pub struct JwtBearerIssuer {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  ttl: Duration,
}

impl JwtBearerIssuer {
  pub fn new(secret: &str, ttl: Duration) -> Self {
    Self {
      encoding_key: EncodingKey::from_secret(secret.as_bytes()),
      decoding_key: DecodingKey::from_secret(secret.as_bytes()),
      ttl,
    }
  }

  pub fn from_config(config: &SecurityConfig) -> Self {
    Self::new(&config.bearer_secret, config.bearer_ttl())
  }
}

impl BearerTokenIssuer for JwtBearerIssuer {
  fn issue(&self, user: &User) -> Result<BearerToken, TokenError> {
    let now = Utc::now();
    let expires_at = now + self.ttl;

    let claims = BearerClaims {
      sub: user.id,
      email: user.email.clone(),
      role: user.role,
      iat: now.timestamp(),
      exp: expires_at.timestamp(),
    };

    let token = encode(&Header::default(), &claims, &self.encoding_key)
      .map_err(|e| TokenError::SigningFailed(e.to_string()))?;

    Ok(BearerToken { token, expires_at })
  }

  fn verify(&self, token: &str) -> Result<BearerClaims, TokenError> {
    let token_data = decode::<BearerClaims>(token, &self.decoding_key, &Validation::default())
      .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::ExpiredBearer,
        _ => TokenError::InvalidBearer,
      })?;

    Ok(token_data.claims)
  }
}
