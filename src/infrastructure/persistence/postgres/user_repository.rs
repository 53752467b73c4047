use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::auth::{
  entities::User,
  errors::RepositoryError,
  ports::UserRepository,
  value_objects::{Email, TokenHash, UserRole},
};
use crate::infrastructure::config::DatabaseConfig;

const USER_COLUMNS: &str = r#"
                id,
                email,
                password_hash,
                first_name,
                last_name,
                role,
                is_active,
                is_email_verified,
                last_login_at,
                password_reset_token,
                password_reset_token_expires_at,
                created_at,
                updated_at
"#;

/// PostgreSQL implementation of the UserRepository trait
pub struct PostgresUserRepository {
  pool: PgPool,
}

impl PostgresUserRepository {
  /// Creates a new instance of PostgresUserRepository
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Opens a pool with the configured timeouts and brings the schema up to date
  pub async fn connect(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
    tracing::info!("Creating database connection pool");

    let pool = tokio::time::timeout(
      Duration::from_secs(config.connect_timeout_seconds),
      PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect(&config.url),
    )
    .await
    .map_err(|_| {
      tracing::error!(
        "Database connection timed out after {} seconds. Is PostgreSQL running?",
        config.connect_timeout_seconds
      );
      RepositoryError::ConnectionFailed(format!(
        "Database connection timed out after {} seconds",
        config.connect_timeout_seconds
      ))
    })?
    .map_err(|e| {
      tracing::error!("Failed to connect to database: {}", e);
      RepositoryError::ConnectionFailed(e.to_string())
    })?;

    tracing::info!("Running database migrations");
    sqlx::migrate!("./migrations")
      .run(&pool)
      .await
      .map_err(|e| RepositoryError::DatabaseError(format!("Migration failed: {}", e)))?;
    tracing::info!("Database migrations completed");

    Ok(Self::new(pool))
  }
}

/// Database row structure for users table
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
  id: Uuid,
  email: String,
  password_hash: String,
  first_name: String,
  last_name: String,
  role: String,
  is_active: bool,
  is_email_verified: bool,
  last_login_at: Option<DateTime<Utc>>,
  password_reset_token: Option<String>,
  password_reset_token_expires_at: Option<DateTime<Utc>>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
  type Error = RepositoryError;

  fn try_from(row: UserRow) -> Result<Self, Self::Error> {
    let role = row
      .role
      .parse::<UserRole>()
      .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

    Ok(User {
      id: row.id,
      email: row.email,
      password_hash: row.password_hash,
      first_name: row.first_name,
      last_name: row.last_name,
      role,
      is_active: row.is_active,
      is_email_verified: row.is_email_verified,
      last_login_at: row.last_login_at,
      password_reset_token: row.password_reset_token,
      password_reset_token_expires_at: row.password_reset_token_expires_at,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

/// Turns "zero rows touched" into `NotFound`
fn expect_one_row(result: sqlx::postgres::PgQueryResult) -> Result<(), RepositoryError> {
  if result.rows_affected() == 0 {
    Err(RepositoryError::NotFound)
  } else {
    Ok(())
  }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
  async fn create(&self, user: User) -> Result<User, RepositoryError> {
    let query = format!(
      r#"
            INSERT INTO users (
                id,
                email,
                password_hash,
                first_name,
                last_name,
                role,
                is_active,
                is_email_verified,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
    );

    let row = sqlx::query_as::<_, UserRow>(&query)
      .bind(user.id)
      .bind(&user.email)
      .bind(&user.password_hash)
      .bind(&user.first_name)
      .bind(&user.last_name)
      .bind(user.role.as_str())
      .bind(user.is_active)
      .bind(user.is_email_verified)
      .fetch_one(&self.pool)
      .await?;

    row.try_into()
  }

  async fn get_by_id(&self, id: Uuid) -> Result<User, RepositoryError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

    sqlx::query_as::<_, UserRow>(&query)
      .bind(id)
      .fetch_optional(&self.pool)
      .await?
      .ok_or(RepositoryError::NotFound)?
      .try_into()
  }

  async fn get_by_email(&self, email: &Email) -> Result<User, RepositoryError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

    sqlx::query_as::<_, UserRow>(&query)
      .bind(email.as_str())
      .fetch_optional(&self.pool)
      .await?
      .ok_or(RepositoryError::NotFound)?
      .try_into()
  }

  async fn update(&self, user: &User) -> Result<User, RepositoryError> {
    let query = format!(
      r#"
            UPDATE users
            SET
                email = $2,
                password_hash = $3,
                first_name = $4,
                last_name = $5,
                role = $6,
                is_active = $7,
                is_email_verified = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
    );

    sqlx::query_as::<_, UserRow>(&query)
      .bind(user.id)
      .bind(&user.email)
      .bind(&user.password_hash)
      .bind(&user.first_name)
      .bind(&user.last_name)
      .bind(user.role.as_str())
      .bind(user.is_active)
      .bind(user.is_email_verified)
      .fetch_optional(&self.pool)
      .await?
      .ok_or(RepositoryError::NotFound)?
      .try_into()
  }

  async fn update_last_login(&self, id: Uuid) -> Result<(), RepositoryError> {
    let result = sqlx::query(
      r#"
            UPDATE users
            SET
                last_login_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
    )
    .bind(id)
    .execute(&self.pool)
    .await?;

    expect_one_row(result)
  }

  async fn set_reset_token(
    &self,
    email: &Email,
    token_hash: &TokenHash,
    expires_at: DateTime<Utc>,
  ) -> Result<(), RepositoryError> {
    let result = sqlx::query(
      r#"
            UPDATE users
            SET
                password_reset_token = $2,
                password_reset_token_expires_at = $3,
                updated_at = NOW()
            WHERE email = $1
            "#,
    )
    .bind(email.as_str())
    .bind(token_hash.as_str())
    .bind(expires_at)
    .execute(&self.pool)
    .await?;

    expect_one_row(result)
  }

  async fn get_by_reset_token(&self, token_hash: &TokenHash) -> Result<User, RepositoryError> {
    let query = format!(
      r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE password_reset_token = $1
              AND password_reset_token_expires_at > NOW()
            "#
    );

    sqlx::query_as::<_, UserRow>(&query)
      .bind(token_hash.as_str())
      .fetch_optional(&self.pool)
      .await?
      .ok_or(RepositoryError::NotFound)?
      .try_into()
  }

  async fn clear_reset_token(&self, id: Uuid) -> Result<(), RepositoryError> {
    let result = sqlx::query(
      r#"
            UPDATE users
            SET
                password_reset_token = NULL,
                password_reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
    )
    .bind(id)
    .execute(&self.pool)
    .await?;

    expect_one_row(result)
  }
}
