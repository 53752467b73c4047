use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::entities::{Session, User};
use super::errors::{AuthError, RepositoryError};
use super::ports::{
  BearerClaims, BearerToken, BearerTokenIssuer, PasswordHasher, PasswordResetNotifier,
  SessionRepository, TokenGenerator, UserRepository,
};
use super::value_objects::{Email, Password, PasswordHash, ResetToken, SessionId, UserRole};

/// Lifetimes used by the auth service
#[derive(Debug, Clone, Copy)]
pub struct AuthServiceConfig {
  pub session_ttl: Duration,
  pub password_reset_ttl: Duration,
}

impl Default for AuthServiceConfig {
  fn default() -> Self {
    Self {
      session_ttl: Duration::hours(2),
      password_reset_ttl: Duration::hours(1),
    }
  }
}

/// Collaborators of the auth service
pub struct AuthServiceDependencies {
  pub user_repo: Arc<dyn UserRepository>,
  pub session_repo: Arc<dyn SessionRepository>,
  pub password_hasher: Arc<dyn PasswordHasher>,
  pub token_generator: Arc<dyn TokenGenerator>,
  pub bearer_issuer: Arc<dyn BearerTokenIssuer>,
  pub notifier: Arc<dyn PasswordResetNotifier>,
}

/// Result of a successful registration or login
#[derive(Debug, Clone)]
pub struct AuthOutcome {
  pub user: User,
  pub session: Session,
  pub bearer: BearerToken,
}

/// New user details accepted by [`AuthService::register`]
#[derive(Debug)]
pub struct NewUser {
  pub email: Email,
  pub password: Password,
  pub first_name: String,
  pub last_name: String,
  pub role: UserRole,
}

/// Authentication service implementing core business logic
///
/// Holds no mutable state; every coordination point is one of the two stores.
pub struct AuthService {
  user_repo: Arc<dyn UserRepository>,
  session_repo: Arc<dyn SessionRepository>,
  password_hasher: Arc<dyn PasswordHasher>,
  token_generator: Arc<dyn TokenGenerator>,
  bearer_issuer: Arc<dyn BearerTokenIssuer>,
  notifier: Arc<dyn PasswordResetNotifier>,
  config: AuthServiceConfig,
}

impl AuthService {
  /// Creates a new instance of AuthService
  pub fn new(deps: AuthServiceDependencies, config: AuthServiceConfig) -> Self {
    Self {
      user_repo: deps.user_repo,
      session_repo: deps.session_repo,
      password_hasher: deps.password_hasher,
      token_generator: deps.token_generator,
      bearer_issuer: deps.bearer_issuer,
      notifier: deps.notifier,
      config,
    }
  }

  /// Registers a new user and opens a first session for them
  ///
  /// # Errors
  /// * `AuthError::EmailAlreadyExists` if the email is registered, including
  ///   when a concurrent registration wins the store's uniqueness check
  /// * `AuthError::WeakPassword` if the password is too short
  #[tracing::instrument(skip_all, fields(email = %new_user.email))]
  pub async fn register(&self, new_user: NewUser) -> Result<AuthOutcome, AuthError> {
    const OP: &str = "register";

    // Cheap early exit; the store's unique constraint is the real guard
    match self.user_repo.get_by_email(&new_user.email).await {
      Ok(_) => return Err(AuthError::EmailAlreadyExists),
      Err(RepositoryError::NotFound) => {}
      Err(e) => return Err(AuthError::repository(OP, e)),
    }

    let password_hash = self
      .password_hasher
      .hash(&new_user.password)
      .await
      .map_err(|e| AuthError::hash(OP, e))?;

    let user = User::new(
      new_user.email.into_inner(),
      password_hash.into_inner(),
      new_user.first_name,
      new_user.last_name,
      new_user.role,
    );

    let created_user = match self.user_repo.create(user).await {
      Ok(user) => user,
      Err(RepositoryError::DuplicateKey(_)) => return Err(AuthError::EmailAlreadyExists),
      Err(e) => return Err(AuthError::repository(OP, e)),
    };

    let outcome = self.open_session(OP, created_user).await?;
    tracing::info!(user_id = %outcome.user.id, "User registered");

    Ok(outcome)
  }

  /// Authenticates a user and opens a new, independent session
  ///
  /// # Errors
  /// * `AuthError::InvalidCredentials` for an unknown email or a wrong password,
  ///   indistinguishably
  /// * `AuthError::AccountDeactivated` if the password is right but the
  ///   account is inactive
  #[tracing::instrument(skip_all, fields(email = %email))]
  pub async fn login(&self, email: Email, password: Password) -> Result<AuthOutcome, AuthError> {
    const OP: &str = "login";

    let user = match self.user_repo.get_by_email(&email).await {
      Ok(user) => user,
      Err(RepositoryError::NotFound) => return Err(AuthError::InvalidCredentials),
      Err(e) => return Err(AuthError::repository(OP, e)),
    };

    let stored_hash = PasswordHash::from_hash(user.password_hash.clone());
    if !self.password_hasher.verify(&password, &stored_hash).await {
      return Err(AuthError::InvalidCredentials);
    }

    if !user.is_active {
      return Err(AuthError::AccountDeactivated);
    }

    // Bookkeeping only; a failure here must not block the login
    if let Err(e) = self.user_repo.update_last_login(user.id).await {
      tracing::warn!(user_id = %user.id, error = %e, "Failed to update last login");
    }

    let outcome = self.open_session(OP, user).await?;
    tracing::info!(user_id = %outcome.user.id, "User logged in");

    Ok(outcome)
  }

  /// Deletes a session. Logging out of an unknown session is not an error.
  #[tracing::instrument(skip_all)]
  pub async fn logout(&self, session_id: &SessionId) -> Result<(), AuthError> {
    self
      .session_repo
      .delete(session_id)
      .await
      .map_err(|e| AuthError::repository("logout", e))?;

    tracing::debug!("Session closed");
    Ok(())
  }

  /// Logs out all sessions for a specific user
  ///
  /// # Returns
  /// The number of sessions deleted
  ///
  /// # Errors
  /// Returns `AuthError::UserNotFound` if user doesn't exist
  #[tracing::instrument(skip(self))]
  pub async fn logout_all(&self, user_id: Uuid) -> Result<usize, AuthError> {
    const OP: &str = "logout_all";

    self.load_user(OP, user_id).await?;

    let removed = self
      .session_repo
      .delete_all_for_user(user_id)
      .await
      .map_err(|e| AuthError::repository(OP, e))?;

    tracing::info!(removed, "Closed all sessions for user");
    Ok(removed)
  }

  /// Fetches a session without looking at its owner
  ///
  /// # Errors
  /// `AuthError::SessionNotFound` or `AuthError::SessionExpired`
  #[tracing::instrument(skip_all)]
  pub async fn get_session(&self, session_id: &SessionId) -> Result<Session, AuthError> {
    self.load_session("get_session", session_id).await
  }

  /// Resolves a session to its current, active owner
  ///
  /// The owner is re-read on every call, so deactivating an account cuts off
  /// all of its sessions without touching the session store.
  #[tracing::instrument(skip_all)]
  pub async fn validate_session(&self, session_id: &SessionId) -> Result<User, AuthError> {
    const OP: &str = "validate_session";

    let session = self.load_session(OP, session_id).await?;
    let user = self.load_user(OP, session.user_id).await?;

    if !user.is_active {
      return Err(AuthError::AccountDeactivated);
    }

    Ok(user)
  }

  /// Re-snapshots email and role from the owner into an existing session,
  /// keeping its expiry
  #[tracing::instrument(skip_all)]
  pub async fn refresh_session(&self, session_id: &SessionId) -> Result<Session, AuthError> {
    const OP: &str = "refresh_session";

    let mut session = self.load_session(OP, session_id).await?;
    let user = self.load_user(OP, session.user_id).await?;

    if !user.is_active {
      return Err(AuthError::AccountDeactivated);
    }

    session.resnapshot(&user);

    match self.session_repo.update(&session).await {
      Ok(()) => Ok(session),
      Err(RepositoryError::NotFound) => Err(AuthError::SessionNotFound),
      Err(RepositoryError::Expired) => Err(AuthError::SessionExpired),
      Err(e) => Err(AuthError::repository(OP, e)),
    }
  }

  /// Activates or deactivates an account
  #[tracing::instrument(skip(self))]
  pub async fn set_account_active(&self, user_id: Uuid, active: bool) -> Result<User, AuthError> {
    const OP: &str = "set_account_active";

    let mut user = self.load_user(OP, user_id).await?;
    user.set_active(active);

    let updated = match self.user_repo.update(&user).await {
      Ok(user) => user,
      Err(RepositoryError::NotFound) => return Err(AuthError::UserNotFound),
      Err(e) => return Err(AuthError::repository(OP, e)),
    };

    tracing::info!("Account active flag changed");
    Ok(updated)
  }

  /// Starts the password reset flow
  ///
  /// Succeeds without any effect for unknown emails, so the response never
  /// reveals whether an address is registered.
  #[tracing::instrument(skip_all, fields(email = %email))]
  pub async fn request_password_reset(&self, email: Email) -> Result<(), AuthError> {
    const OP: &str = "request_password_reset";

    match self.user_repo.get_by_email(&email).await {
      Ok(_) => {}
      Err(RepositoryError::NotFound) => {
        tracing::debug!("Password reset requested for unknown email");
        return Ok(());
      }
      Err(e) => return Err(AuthError::repository(OP, e)),
    }

    let raw = self
      .token_generator
      .generate(ResetToken::BYTE_LENGTH)
      .await
      .map_err(|e| AuthError::token(OP, e))?;
    let token = ResetToken::from_generated(raw);
    let expires_at = Utc::now() + self.config.password_reset_ttl;

    match self
      .user_repo
      .set_reset_token(&email, &token.hash(), expires_at)
      .await
    {
      Ok(()) => {}
      // The account vanished between lookup and write
      Err(RepositoryError::NotFound) => return Ok(()),
      Err(e) => return Err(AuthError::repository(OP, e)),
    }

    // Delivery is the notifier's job; reporting its failure would leak existence
    if let Err(e) = self
      .notifier
      .send_reset_token(&email, &token, expires_at)
      .await
    {
      tracing::error!(error = %e, "Failed to dispatch password reset token");
    }

    tracing::info!("Password reset token issued");
    Ok(())
  }

  /// Completes the password reset flow and revokes every existing session
  ///
  /// # Errors
  /// * `AuthError::InvalidOrExpiredResetToken` if no user holds an unexpired
  ///   token with this value
  /// * `AuthError::WeakPassword` if the new password is too short
  #[tracing::instrument(skip_all)]
  pub async fn reset_password(
    &self,
    token: ResetToken,
    new_password: Password,
  ) -> Result<(), AuthError> {
    const OP: &str = "reset_password";

    let mut user = match self.user_repo.get_by_reset_token(&token.hash()).await {
      Ok(user) => user,
      Err(RepositoryError::NotFound) => return Err(AuthError::InvalidOrExpiredResetToken),
      Err(e) => return Err(AuthError::repository(OP, e)),
    };

    let password_hash = self
      .password_hasher
      .hash(&new_password)
      .await
      .map_err(|e| AuthError::hash(OP, e))?;

    user.update_password(password_hash.into_inner());
    self
      .user_repo
      .update(&user)
      .await
      .map_err(|e| AuthError::repository(OP, e))?;

    self
      .user_repo
      .clear_reset_token(user.id)
      .await
      .map_err(|e| AuthError::repository(OP, e))?;

    // Best effort: the password change stands even if revocation is partial
    match self.session_repo.delete_all_for_user(user.id).await {
      Ok(removed) => tracing::info!(user_id = %user.id, removed, "Password reset, sessions revoked"),
      Err(e) => tracing::error!(
        user_id = %user.id,
        error = %e,
        "Password reset but failed to revoke existing sessions"
      ),
    }

    Ok(())
  }

  /// Verifies a bearer credential without touching any store
  pub fn verify_bearer(&self, token: &str) -> Result<BearerClaims, AuthError> {
    self
      .bearer_issuer
      .verify(token)
      .map_err(|_| AuthError::InvalidBearerToken)
  }

  async fn open_session(&self, op: &'static str, user: User) -> Result<AuthOutcome, AuthError> {
    let bearer = self
      .bearer_issuer
      .issue(&user)
      .map_err(|e| AuthError::token(op, e))?;

    let session = Session::with_duration(&user, self.config.session_ttl);
    self
      .session_repo
      .create(&session)
      .await
      .map_err(|e| AuthError::repository(op, e))?;

    Ok(AuthOutcome {
      user,
      session,
      bearer,
    })
  }

  async fn load_session(
    &self,
    op: &'static str,
    session_id: &SessionId,
  ) -> Result<Session, AuthError> {
    match self.session_repo.get(session_id).await {
      Ok(session) => Ok(session),
      Err(RepositoryError::NotFound) => Err(AuthError::SessionNotFound),
      Err(RepositoryError::Expired) => Err(AuthError::SessionExpired),
      Err(e) => Err(AuthError::repository(op, e)),
    }
  }

  async fn load_user(&self, op: &'static str, user_id: Uuid) -> Result<User, AuthError> {
    match self.user_repo.get_by_id(user_id).await {
      Ok(user) => Ok(user),
      Err(RepositoryError::NotFound) => Err(AuthError::UserNotFound),
      Err(e) => Err(AuthError::repository(op, e)),
    }
  }
}
