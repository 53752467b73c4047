use actix_web::{
  Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError,
  body::EitherBody,
  dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{
  future::{Ready, ready},
  rc::Rc,
  sync::Arc,
};

use crate::{
  adapters::http::errors::{ApiError, AuthErrorKind},
  adapters::http::session_id::extract_session_id,
  application::auth::ValidateSessionUseCase,
  domain::auth::entities::PublicUser,
};

/// The caller's validated session, placed in request extensions by
/// [`SessionAuthMiddleware`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
  pub user: PublicUser,
  pub session_id: String,
}

/// Authentication middleware that validates session ids and attaches the
/// owner to the request
///
/// This middleware:
/// 1. Extracts the session id (header, bearer, cookie or query parameter)
/// 2. Validates it using ValidateSessionUseCase
/// 3. Attaches an [`AuthenticatedSession`] to request extensions
/// 4. Returns 401 Unauthorized if the session is missing, unknown, expired or
///    belongs to a deactivated account
///
/// # Example
///
/// ```no_run
/// use actix_web::{App, web};
/// use std::sync::Arc;
/// # use gatehouse::application::auth::ValidateSessionUseCase;
/// # use gatehouse::adapters::http::middleware::{AuthenticatedSession, SessionAuthMiddleware};
///
/// # async fn example(validate: Arc<ValidateSessionUseCase>) {
/// let app = App::new()
///   .wrap(SessionAuthMiddleware::new(validate))
///   .service(
///     web::resource("/me")
///       .route(web::get().to(|session: AuthenticatedSession| async move { session.user.email })),
///   );
/// # }
/// ```
pub struct SessionAuthMiddleware {
  validate_use_case: Arc<ValidateSessionUseCase>,
}

impl SessionAuthMiddleware {
  pub fn new(validate_use_case: Arc<ValidateSessionUseCase>) -> Self {
    Self { validate_use_case }
  }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuthMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Transform = SessionAuthMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(SessionAuthMiddlewareService {
      service: Rc::new(service),
      validate_use_case: self.validate_use_case.clone(),
    }))
  }
}

pub struct SessionAuthMiddlewareService<S> {
  service: Rc<S>,
  validate_use_case: Arc<ValidateSessionUseCase>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthMiddlewareService<S>
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
    let validate_use_case = self.validate_use_case.clone();

    Box::pin(async move {
      let Some(session_id) = extract_session_id(req.request()) else {
        return Ok(reject(req, ApiError::Auth(AuthErrorKind::InvalidSession)));
      };

      let validated = match validate_use_case.execute(session_id).await {
        Ok(response) => response,
        Err(e) => return Ok(reject(req, e.into())),
      };

      req.extensions_mut().insert(AuthenticatedSession {
        user: validated.user,
        session_id: validated.session_id,
      });

      let res = service.call(req).await?;
      Ok(res.map_into_left_body())
    })
  }
}

/// Short-circuits the request. Store failures keep their 500; every other
/// failure is reported as 401.
fn reject<B>(req: ServiceRequest, error: ApiError) -> ServiceResponse<EitherBody<B>> {
  let response = if error.is_internal() {
    error.error_response()
  } else {
    HttpResponse::Unauthorized().json(error.body())
  };

  let (request, _) = req.into_parts();
  ServiceResponse::new(request, response.map_into_right_body())
}

impl FromRequest for AuthenticatedSession {
  type Error = ApiError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
    ready(
      req
        .extensions()
        .get::<AuthenticatedSession>()
        .cloned()
        .ok_or(ApiError::Auth(AuthErrorKind::InvalidSession)),
    )
  }
}
