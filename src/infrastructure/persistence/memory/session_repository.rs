use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::auth::{
  entities::Session, errors::RepositoryError, ports::SessionRepository, value_objects::SessionId,
};
use crate::infrastructure::persistence::session_ttl_seconds;

struct Entry {
  session: Session,
  /// When the store itself forgets the entry, like a key TTL
  evict_at: DateTime<Utc>,
}

impl Entry {
  fn new(session: Session) -> Self {
    let ttl = i64::try_from(session_ttl_seconds(&session)).unwrap_or(i64::MAX / 1_000);
    Self {
      evict_at: Utc::now() + Duration::seconds(ttl),
      session,
    }
  }

  fn is_evicted(&self, now: DateTime<Utc>) -> bool {
    self.evict_at <= now
  }
}

#[derive(Default)]
struct Inner {
  sessions: HashMap<SessionId, Entry>,
  by_user: HashMap<Uuid, HashSet<SessionId>>,
}

impl Inner {
  fn remove(&mut self, id: &SessionId) -> Option<Entry> {
    let entry = self.sessions.remove(id)?;
    if let Some(ids) = self.by_user.get_mut(&entry.session.user_id) {
      ids.remove(id);
      if ids.is_empty() {
        self.by_user.remove(&entry.session.user_id);
      }
    }
    Some(entry)
  }

  /// Drops every entry whose TTL has run out, read or not
  fn sweep(&mut self, now: DateTime<Utc>) {
    let evicted: Vec<SessionId> = self
      .sessions
      .iter()
      .filter(|(_, entry)| entry.is_evicted(now))
      .map(|(id, _)| id.clone())
      .collect();

    for id in &evicted {
      self.remove(id);
    }
  }
}

/// In-memory implementation of the SessionRepository trait
///
/// Mirrors the key-value store semantics: entries carry a whole-second TTL
/// and a per-user index, and an entry whose embedded expiry has passed is
/// removed when read. Entries whose TTL ran out are swept on every insert.
#[derive(Default)]
pub struct InMemorySessionRepository {
  inner: RwLock<Inner>,
}

impl InMemorySessionRepository {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of entries currently held, including ones not yet evicted
  pub async fn len(&self) -> usize {
    self.inner.read().await.sessions.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.inner.read().await.sessions.is_empty()
  }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
  async fn create(&self, session: &Session) -> Result<(), RepositoryError> {
    let mut inner = self.inner.write().await;
    inner.sweep(Utc::now());

    inner
      .by_user
      .entry(session.user_id)
      .or_default()
      .insert(session.id.clone());
    inner
      .sessions
      .insert(session.id.clone(), Entry::new(session.clone()));

    Ok(())
  }

  async fn get(&self, id: &SessionId) -> Result<Session, RepositoryError> {
    let now = Utc::now();
    let mut inner = self.inner.write().await;

    let Some(entry) = inner.sessions.get(id) else {
      return Err(RepositoryError::NotFound);
    };

    if entry.is_evicted(now) {
      inner.remove(id);
      Err(RepositoryError::NotFound)
    } else if entry.session.expires_at <= now {
      inner.remove(id);
      Err(RepositoryError::Expired)
    } else {
      Ok(entry.session.clone())
    }
  }

  async fn delete(&self, id: &SessionId) -> Result<(), RepositoryError> {
    self.inner.write().await.remove(id);
    Ok(())
  }

  async fn delete_all_for_user(&self, user_id: Uuid) -> Result<usize, RepositoryError> {
    let mut inner = self.inner.write().await;

    let ids = inner.by_user.remove(&user_id).unwrap_or_default();
    let removed = ids
      .iter()
      .filter(|id| inner.sessions.remove(*id).is_some())
      .count();

    Ok(removed)
  }

  async fn update(&self, session: &Session) -> Result<(), RepositoryError> {
    let now = Utc::now();
    let mut inner = self.inner.write().await;

    let live = inner
      .sessions
      .get(&session.id)
      .is_some_and(|entry| !entry.is_evicted(now));
    if !live {
      inner.remove(&session.id);
      return Err(RepositoryError::NotFound);
    }

    if session.expires_at <= now {
      inner.remove(&session.id);
      return Err(RepositoryError::Expired);
    }

    inner
      .sessions
      .insert(session.id.clone(), Entry::new(session.clone()));

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::auth::entities::User;
  use crate::domain::auth::value_objects::UserRole;

  fn test_user() -> User {
    User::new(
      "sess@example.com".to_string(),
      "hash".to_string(),
      "Sess".to_string(),
      "Ion".to_string(),
      UserRole::Staff,
    )
  }

  #[tokio::test]
  async fn test_create_and_get() {
    let repo = InMemorySessionRepository::new();
    let session = Session::with_duration(&test_user(), Duration::hours(1));

    repo.create(&session).await.unwrap();

    assert_eq!(repo.get(&session.id).await.unwrap(), session);
  }

  #[tokio::test]
  async fn test_get_unknown_is_not_found() {
    let repo = InMemorySessionRepository::new();
    let id = SessionId::from_string("does-not-exist").unwrap();

    assert!(matches!(repo.get(&id).await, Err(RepositoryError::NotFound)));
  }

  #[tokio::test]
  async fn test_expired_session_is_removed_on_read() {
    let repo = InMemorySessionRepository::new();
    let session = Session::with_duration(&test_user(), Duration::milliseconds(50));
    repo.create(&session).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert!(matches!(
      repo.get(&session.id).await,
      Err(RepositoryError::Expired)
    ));
    assert!(matches!(
      repo.get(&session.id).await,
      Err(RepositoryError::NotFound)
    ));
    assert!(repo.is_empty().await);
  }

  #[tokio::test]
  async fn test_delete_is_idempotent() {
    let repo = InMemorySessionRepository::new();
    let session = Session::with_duration(&test_user(), Duration::hours(1));
    repo.create(&session).await.unwrap();

    repo.delete(&session.id).await.unwrap();
    repo.delete(&session.id).await.unwrap();

    assert!(matches!(
      repo.get(&session.id).await,
      Err(RepositoryError::NotFound)
    ));
  }

  #[tokio::test]
  async fn test_delete_all_for_user() {
    let repo = InMemorySessionRepository::new();
    let user = test_user();
    let other = User::new(
      "other@example.com".to_string(),
      "hash".to_string(),
      "O".to_string(),
      "T".to_string(),
      UserRole::Admin,
    );

    let sessions: Vec<_> = (0..3)
      .map(|_| Session::with_duration(&user, Duration::hours(1)))
      .collect();
    for session in &sessions {
      repo.create(session).await.unwrap();
    }
    let foreign = Session::with_duration(&other, Duration::hours(1));
    repo.create(&foreign).await.unwrap();

    assert_eq!(repo.delete_all_for_user(user.id).await.unwrap(), 3);
    assert_eq!(repo.delete_all_for_user(user.id).await.unwrap(), 0);

    for session in &sessions {
      assert!(repo.get(&session.id).await.is_err());
    }
    assert!(repo.get(&foreign.id).await.is_ok());
  }

  #[tokio::test]
  async fn test_update_rewrites_existing_session() {
    let repo = InMemorySessionRepository::new();
    let mut session = Session::with_duration(&test_user(), Duration::hours(1));
    repo.create(&session).await.unwrap();

    session.role = UserRole::Admin;
    session.expires_at = Utc::now() + Duration::hours(3);
    repo.update(&session).await.unwrap();

    let stored = repo.get(&session.id).await.unwrap();
    assert_eq!(stored.role, UserRole::Admin);
    assert_eq!(stored.expires_at, session.expires_at);
  }

  #[tokio::test]
  async fn test_update_missing_or_expired() {
    let repo = InMemorySessionRepository::new();
    let mut session = Session::with_duration(&test_user(), Duration::hours(1));

    assert!(matches!(
      repo.update(&session).await,
      Err(RepositoryError::NotFound)
    ));

    repo.create(&session).await.unwrap();
    session.expires_at = Utc::now() - Duration::seconds(1);
    assert!(matches!(
      repo.update(&session).await,
      Err(RepositoryError::Expired)
    ));
    assert!(repo.is_empty().await);
  }

  #[tokio::test]
  async fn test_unread_sessions_are_swept_on_create() {
    let repo = InMemorySessionRepository::new();
    let user = test_user();

    for _ in 0..1000 {
      let session = Session::with_duration(&user, Duration::milliseconds(10));
      repo.create(&session).await.unwrap();
    }
    assert_eq!(repo.len().await, 1000);

    // Whole-second TTL, so every entry above is evictable after one second
    tokio::time::sleep(std::time::Duration::from_millis(1200)).await;

    let fresh = Session::with_duration(&user, Duration::hours(1));
    repo.create(&fresh).await.unwrap();

    assert_eq!(repo.len().await, 1);
    assert!(repo.get(&fresh.id).await.is_ok());
    assert_eq!(repo.delete_all_for_user(user.id).await.unwrap(), 1);
  }
}
