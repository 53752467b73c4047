use actix_web::{
  Error, HttpMessage, ResponseError,
  body::EitherBody,
  dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{
  future::{Ready, ready},
  rc::Rc,
  sync::Arc,
};

use super::auth::AuthenticatedSession;
use crate::{
  adapters::http::errors::{ApiError, AuthErrorKind},
  domain::auth::value_objects::UserRole,
};

/// Restricts a scope to the given roles
///
/// Relies on [`SessionAuthMiddleware`](super::SessionAuthMiddleware) having
/// run first, so register this on an inner scope:
///
/// ```no_run
/// use actix_web::{App, HttpResponse, web};
/// use std::sync::Arc;
/// # use gatehouse::application::auth::ValidateSessionUseCase;
/// # use gatehouse::adapters::http::middleware::{RequireRole, SessionAuthMiddleware};
/// # use gatehouse::domain::auth::UserRole;
///
/// # fn example(validate: Arc<ValidateSessionUseCase>) {
/// let app = App::new().wrap(SessionAuthMiddleware::new(validate)).service(
///   web::scope("/admin")
///     .wrap(RequireRole::new([UserRole::Admin]))
///     .route("/users", web::get().to(|| async { HttpResponse::Ok().finish() })),
/// );
/// # }
/// ```
///
/// Replies 401 when no session was attached and 403 when the session's role
/// is not in the allowed set.
pub struct RequireRole {
  allowed: Arc<[UserRole]>,
}

impl RequireRole {
  pub fn new(allowed: impl IntoIterator<Item = UserRole>) -> Self {
    Self {
      allowed: allowed.into_iter().collect(),
    }
  }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Transform = RequireRoleService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(RequireRoleService {
      service: Rc::new(service),
      allowed: self.allowed.clone(),
    }))
  }
}

pub struct RequireRoleService<S> {
  service: Rc<S>,
  allowed: Arc<[UserRole]>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let service = Rc::clone(&self.service);

    let role = req
      .extensions()
      .get::<AuthenticatedSession>()
      .map(|session| session.user.role);

    let denied = match role {
      None => Some(ApiError::Auth(AuthErrorKind::InvalidSession)),
      Some(role) if !self.allowed.contains(&role) => {
        tracing::debug!(role = %role, "Role not allowed for this route");
        Some(ApiError::Auth(AuthErrorKind::InsufficientRole))
      }
      Some(_) => None,
    };

    Box::pin(async move {
      if let Some(error) = denied {
        let (request, _) = req.into_parts();
        let response = error.error_response().map_into_right_body();
        return Ok(ServiceResponse::new(request, response));
      }

      let res = service.call(req).await?;
      Ok(res.map_into_left_body())
    })
  }
}
