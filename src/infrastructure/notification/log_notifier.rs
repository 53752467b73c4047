use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::auth::ports::{NotificationError, PasswordResetNotifier};
use crate::domain::auth::value_objects::{Email, ResetToken};

/// Development notifier that writes reset tokens to the log
///
/// Stands in for a real mail or SMS channel. The token itself is logged, so
/// this must not be wired up in production.
#[derive(Debug, Default, Clone)]
pub struct TracingResetNotifier;

impl TracingResetNotifier {
  pub fn new() -> Self {
    Self
  }
}

#[async_trait]
impl PasswordResetNotifier for TracingResetNotifier {
  async fn send_reset_token(
    &self,
    email: &Email,
    token: &ResetToken,
    expires_at: DateTime<Utc>,
  ) -> Result<(), NotificationError> {
    tracing::info!(
      email = %email,
      token = token.as_str(),
      expires_at = %expires_at,
      "Password reset requested"
    );
    Ok(())
  }
}
