use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::entities::PublicUser;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;

/// Administrative use case for enabling or disabling an account
///
/// Disabling does not delete sessions; they stop validating on their next use.
pub struct SetAccountActiveUseCase {
  auth_service: Arc<AuthService>,
}

impl SetAccountActiveUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  pub async fn execute(&self, user_id: Uuid, active: bool) -> Result<PublicUser, AuthError> {
    let user = self.auth_service.set_account_active(user_id, active).await?;

    Ok(PublicUser::from(&user))
  }
}
