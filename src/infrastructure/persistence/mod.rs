pub mod memory;
pub mod postgres;
pub mod redis;

use chrono::Utc;

use crate::domain::auth::entities::Session;

/// Seconds a session entry should live in a store: the time left until
/// `expires_at`, rounded up, and never less than one second.
pub(crate) fn session_ttl_seconds(session: &Session) -> u64 {
  let remaining_ms = (session.expires_at - Utc::now()).num_milliseconds();
  let seconds = (remaining_ms + 999).div_euclid(1000);
  u64::try_from(seconds).unwrap_or(0).max(1)
}
