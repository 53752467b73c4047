use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::sync::LazyLock;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::auth::{
  entities::Session, errors::RepositoryError, ports::SessionRepository, value_objects::SessionId,
};
use crate::infrastructure::config::RedisConfig;
use crate::infrastructure::persistence::session_ttl_seconds;

fn session_key(id: &str) -> String {
  format!("session:{}", id)
}

fn user_sessions_key(user_id: Uuid) -> String {
  format!("user_sessions:{}", user_id)
}

// The index must outlive every session listed in it, so its TTL only ever
// grows. TTL reports -1 for a set that SADD has just created.
//
// KEYS: session, index. ARGV: payload, ttl, session id.
static CREATE_SESSION: LazyLock<Script> = LazyLock::new(|| {
  Script::new(
    r#"
redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[2])
redis.call('SADD', KEYS[2], ARGV[3])
local ttl = tonumber(ARGV[2])
if redis.call('TTL', KEYS[2]) < ttl then
  redis.call('EXPIRE', KEYS[2], ttl)
end
return 1
"#,
  )
});

// Same as above, but SET XX never resurrects a deleted session. Returns 0
// when the session key is gone.
static UPDATE_SESSION: LazyLock<Script> = LazyLock::new(|| {
  Script::new(
    r#"
if not redis.call('SET', KEYS[1], ARGV[1], 'XX', 'EX', ARGV[2]) then
  return 0
end
redis.call('SADD', KEYS[2], ARGV[3])
local ttl = tonumber(ARGV[2])
if redis.call('TTL', KEYS[2]) < ttl then
  redis.call('EXPIRE', KEYS[2], ttl)
end
return 1
"#,
  )
});

/// Redis implementation of the SessionRepository trait
///
/// Each session is a JSON value under `session:{id}` with a TTL matching its
/// remaining lifetime. `user_sessions:{user_id}` is a set of the owner's
/// session ids, used for sign-out everywhere.
#[derive(Clone)]
pub struct RedisSessionRepository {
  redis: ConnectionManager,
}

impl RedisSessionRepository {
  pub fn new(redis: ConnectionManager) -> Self {
    Self { redis }
  }

  /// Opens a connection manager, giving up after the configured timeout
  pub async fn connect(config: &RedisConfig) -> Result<Self, RepositoryError> {
    tracing::info!("Connecting to Redis: {}", config.url);

    let client = redis::Client::open(config.url.as_str()).map_err(|e| {
      tracing::error!("Failed to create Redis client: {}", e);
      RepositoryError::ConnectionFailed(format!("Invalid Redis URL: {}", e))
    })?;

    let manager = tokio::time::timeout(
      Duration::from_secs(config.connect_timeout_seconds),
      client.get_connection_manager(),
    )
    .await
    .map_err(|_| {
      tracing::error!(
        "Redis connection timed out after {} seconds. Is Redis running?",
        config.connect_timeout_seconds
      );
      RepositoryError::ConnectionFailed(format!(
        "Redis connection timed out after {} seconds",
        config.connect_timeout_seconds
      ))
    })?
    .map_err(|e| {
      tracing::error!("Failed to connect to Redis: {}", e);
      RepositoryError::ConnectionFailed(e.to_string())
    })?;

    tracing::info!("Redis connection established");
    Ok(Self::new(manager))
  }

  async fn read(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError> {
    let mut conn = self.redis.clone();
    let payload: Option<String> = conn.get(session_key(id.as_str())).await?;

    match payload {
      Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
      None => Ok(None),
    }
  }

  async fn remove(&self, session: &Session) -> Result<(), RepositoryError> {
    let mut conn = self.redis.clone();
    let _: () = redis::pipe()
      .atomic()
      .del(session_key(session.id.as_str()))
      .ignore()
      .srem(user_sessions_key(session.user_id), session.id.as_str())
      .ignore()
      .query_async(&mut conn)
      .await?;
    Ok(())
  }
}

#[async_trait]
impl SessionRepository for RedisSessionRepository {
  async fn create(&self, session: &Session) -> Result<(), RepositoryError> {
    let payload = serde_json::to_string(session)?;
    let ttl = session_ttl_seconds(session);
    let index = user_sessions_key(session.user_id);

    let mut conn = self.redis.clone();
    let _: i64 = CREATE_SESSION
      .key(session_key(session.id.as_str()))
      .key(&index)
      .arg(payload)
      .arg(ttl)
      .arg(session.id.as_str())
      .invoke_async(&mut conn)
      .await
      .map_err(|e| {
        tracing::error!("Failed to create session: {}", e);
        RepositoryError::from(e)
      })?;

    Ok(())
  }

  async fn get(&self, id: &SessionId) -> Result<Session, RepositoryError> {
    let session = self.read(id).await?.ok_or(RepositoryError::NotFound)?;

    if session.is_expired() {
      if let Err(e) = self.remove(&session).await {
        tracing::warn!("Failed to remove expired session {}: {}", id, e);
      }
      return Err(RepositoryError::Expired);
    }

    Ok(session)
  }

  async fn delete(&self, id: &SessionId) -> Result<(), RepositoryError> {
    match self.read(id).await? {
      Some(session) => self.remove(&session).await,
      None => Ok(()),
    }
  }

  async fn delete_all_for_user(&self, user_id: Uuid) -> Result<usize, RepositoryError> {
    let index = user_sessions_key(user_id);
    let mut conn = self.redis.clone();

    let ids: Vec<String> = conn.smembers(&index).await?;

    let mut removed = 0;
    for id in &ids {
      let key = session_key(id);
      match conn.del::<_, usize>(&key).await {
        Ok(count) => removed += count,
        Err(e) => tracing::warn!("Failed to delete session {} for user {}: {}", id, user_id, e),
      }
    }

    let _: () = conn.del(&index).await?;

    tracing::info!("Deleted {} sessions for user {}", removed, user_id);
    Ok(removed)
  }

  async fn update(&self, session: &Session) -> Result<(), RepositoryError> {
    if session.is_expired() {
      if let Err(e) = self.remove(session).await {
        tracing::warn!("Failed to remove expired session {}: {}", session.id, e);
      }
      return Err(RepositoryError::Expired);
    }

    let payload = serde_json::to_string(session)?;
    let ttl = session_ttl_seconds(session);

    let mut conn = self.redis.clone();
    let written: i64 = UPDATE_SESSION
      .key(session_key(session.id.as_str()))
      .key(user_sessions_key(session.user_id))
      .arg(payload)
      .arg(ttl)
      .arg(session.id.as_str())
      .invoke_async(&mut conn)
      .await?;

    if written == 0 {
      return Err(RepositoryError::NotFound);
    }

    Ok(())
  }
}
