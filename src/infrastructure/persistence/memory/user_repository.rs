use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::auth::{
  entities::User,
  errors::RepositoryError,
  ports::UserRepository,
  value_objects::{Email, TokenHash},
};

/// In-memory implementation of the UserRepository trait
///
/// The email uniqueness check and the insert happen under one write lock, so
/// concurrent registrations of the same address cannot both succeed.
#[derive(Default)]
pub struct InMemoryUserRepository {
  users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn len(&self) -> usize {
    self.users.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.users.read().await.is_empty()
  }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
  async fn create(&self, mut user: User) -> Result<User, RepositoryError> {
    let mut users = self.users.write().await;

    if users.values().any(|existing| existing.email == user.email) {
      return Err(RepositoryError::DuplicateKey(format!(
        "email {} already exists",
        user.email
      )));
    }
    if users.contains_key(&user.id) {
      return Err(RepositoryError::DuplicateKey(format!(
        "id {} already exists",
        user.id
      )));
    }

    let now = Utc::now();
    user.created_at = now;
    user.updated_at = now;
    users.insert(user.id, user.clone());

    Ok(user)
  }

  async fn get_by_id(&self, id: Uuid) -> Result<User, RepositoryError> {
    self
      .users
      .read()
      .await
      .get(&id)
      .cloned()
      .ok_or(RepositoryError::NotFound)
  }

  async fn get_by_email(&self, email: &Email) -> Result<User, RepositoryError> {
    self
      .users
      .read()
      .await
      .values()
      .find(|user| user.email == email.as_str())
      .cloned()
      .ok_or(RepositoryError::NotFound)
  }

  async fn update(&self, user: &User) -> Result<User, RepositoryError> {
    let mut users = self.users.write().await;

    if users
      .values()
      .any(|existing| existing.id != user.id && existing.email == user.email)
    {
      return Err(RepositoryError::DuplicateKey(format!(
        "email {} already exists",
        user.email
      )));
    }

    let stored = users.get_mut(&user.id).ok_or(RepositoryError::NotFound)?;
    stored.email = user.email.clone();
    stored.password_hash = user.password_hash.clone();
    stored.first_name = user.first_name.clone();
    stored.last_name = user.last_name.clone();
    stored.role = user.role;
    stored.is_active = user.is_active;
    stored.is_email_verified = user.is_email_verified;
    stored.updated_at = Utc::now();

    Ok(stored.clone())
  }

  async fn update_last_login(&self, id: Uuid) -> Result<(), RepositoryError> {
    let mut users = self.users.write().await;
    let stored = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
    stored.record_login(Utc::now());
    Ok(())
  }

  async fn set_reset_token(
    &self,
    email: &Email,
    token_hash: &TokenHash,
    expires_at: DateTime<Utc>,
  ) -> Result<(), RepositoryError> {
    let mut users = self.users.write().await;
    let stored = users
      .values_mut()
      .find(|user| user.email == email.as_str())
      .ok_or(RepositoryError::NotFound)?;

    stored.set_password_reset_token(token_hash.as_str().to_string(), expires_at);
    Ok(())
  }

  async fn get_by_reset_token(&self, token_hash: &TokenHash) -> Result<User, RepositoryError> {
    self
      .users
      .read()
      .await
      .values()
      .find(|user| user.is_password_reset_token_valid(token_hash.as_str()))
      .cloned()
      .ok_or(RepositoryError::NotFound)
  }

  async fn clear_reset_token(&self, id: Uuid) -> Result<(), RepositoryError> {
    let mut users = self.users.write().await;
    let stored = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
    stored.clear_password_reset_token();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::auth::value_objects::UserRole;
  use chrono::Duration;
  use std::sync::Arc;

  fn new_user(email: &str) -> User {
    User::new(
      email.to_string(),
      "hash".to_string(),
      "Test".to_string(),
      "User".to_string(),
      UserRole::Staff,
    )
  }

  fn digest(c: &str) -> TokenHash {
    TokenHash::from_hash(c.repeat(64)).unwrap()
  }

  #[tokio::test]
  async fn test_create_and_lookup() {
    let repo = InMemoryUserRepository::new();
    let user = repo.create(new_user("a@example.com")).await.unwrap();

    assert_eq!(repo.get_by_id(user.id).await.unwrap().email, "a@example.com");
    let email = Email::new("a@example.com").unwrap();
    assert_eq!(repo.get_by_email(&email).await.unwrap().id, user.id);

    assert!(matches!(
      repo.get_by_id(Uuid::new_v4()).await,
      Err(RepositoryError::NotFound)
    ));
  }

  #[tokio::test]
  async fn test_email_lookup_is_case_sensitive() {
    let repo = InMemoryUserRepository::new();
    repo.create(new_user("Case@example.com")).await.unwrap();

    let other_case = Email::new("case@example.com").unwrap();
    assert!(matches!(
      repo.get_by_email(&other_case).await,
      Err(RepositoryError::NotFound)
    ));
  }

  #[tokio::test]
  async fn test_duplicate_email_is_rejected() {
    let repo = InMemoryUserRepository::new();
    repo.create(new_user("dup@example.com")).await.unwrap();

    let result = repo.create(new_user("dup@example.com")).await;
    assert!(matches!(result, Err(RepositoryError::DuplicateKey(_))));
    assert_eq!(repo.len().await, 1);
  }

  #[tokio::test]
  async fn test_concurrent_creates_admit_one() {
    let repo = Arc::new(InMemoryUserRepository::new());

    let handles: Vec<_> = (0..16)
      .map(|_| {
        let repo = repo.clone();
        tokio::spawn(async move { repo.create(new_user("race@example.com")).await })
      })
      .collect();

    let mut created = 0;
    for handle in handles {
      if handle.await.unwrap().is_ok() {
        created += 1;
      }
    }

    assert_eq!(created, 1);
    assert_eq!(repo.len().await, 1);
  }

  #[tokio::test]
  async fn test_update_leaves_reset_token_alone() {
    let repo = InMemoryUserRepository::new();
    let user = repo.create(new_user("upd@example.com")).await.unwrap();
    let email = Email::new("upd@example.com").unwrap();

    repo
      .set_reset_token(&email, &digest("a"), Utc::now() + Duration::hours(1))
      .await
      .unwrap();

    let mut changed = user.clone();
    changed.update_password("new_hash".to_string());
    let updated = repo.update(&changed).await.unwrap();

    assert_eq!(updated.password_hash, "new_hash");
    assert!(updated.password_reset_token.is_some());
  }

  #[tokio::test]
  async fn test_reset_token_lookup_honours_expiry() {
    let repo = InMemoryUserRepository::new();
    let user = repo.create(new_user("rt@example.com")).await.unwrap();
    let email = Email::new("rt@example.com").unwrap();

    repo
      .set_reset_token(&email, &digest("b"), Utc::now() + Duration::hours(1))
      .await
      .unwrap();
    assert_eq!(repo.get_by_reset_token(&digest("b")).await.unwrap().id, user.id);

    repo
      .set_reset_token(&email, &digest("b"), Utc::now() - Duration::seconds(1))
      .await
      .unwrap();
    assert!(matches!(
      repo.get_by_reset_token(&digest("b")).await,
      Err(RepositoryError::NotFound)
    ));
  }

  #[tokio::test]
  async fn test_clear_reset_token_and_last_login() {
    let repo = InMemoryUserRepository::new();
    let user = repo.create(new_user("clr@example.com")).await.unwrap();
    let email = Email::new("clr@example.com").unwrap();

    repo
      .set_reset_token(&email, &digest("c"), Utc::now() + Duration::hours(1))
      .await
      .unwrap();
    repo.clear_reset_token(user.id).await.unwrap();
    repo.update_last_login(user.id).await.unwrap();

    let stored = repo.get_by_id(user.id).await.unwrap();
    assert!(stored.password_reset_token.is_none());
    assert!(stored.password_reset_token_expires_at.is_none());
    assert!(stored.last_login_at.is_some());
  }
}
