use actix_web::{
  Error, HttpMessage,
  dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{
  future::{Ready, ready},
  rc::Rc,
  sync::Arc,
};

use super::auth::AuthenticatedSession;
use crate::{adapters::http::session_id::extract_session_id, application::auth::ValidateSessionUseCase};

/// Attaches the caller's session when one is presented and valid, and lets
/// every request through either way
///
/// Handlers take `Option<AuthenticatedSession>` to tell the two cases apart.
pub struct OptionalSessionMiddleware {
  validate_use_case: Arc<ValidateSessionUseCase>,
}

impl OptionalSessionMiddleware {
  pub fn new(validate_use_case: Arc<ValidateSessionUseCase>) -> Self {
    Self { validate_use_case }
  }
}

impl<S, B> Transform<S, ServiceRequest> for OptionalSessionMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<B>;
  type Error = Error;
  type Transform = OptionalSessionMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(OptionalSessionMiddlewareService {
      service: Rc::new(service),
      validate_use_case: self.validate_use_case.clone(),
    }))
  }
}

pub struct OptionalSessionMiddlewareService<S> {
  service: Rc<S>,
  validate_use_case: Arc<ValidateSessionUseCase>,
}

impl<S, B> Service<ServiceRequest> for OptionalSessionMiddlewareService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<B>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let service = Rc::clone(&self.service);
    let validate_use_case = self.validate_use_case.clone();

    Box::pin(async move {
      if let Some(session_id) = extract_session_id(req.request()) {
        match validate_use_case.execute(session_id).await {
          Ok(validated) => {
            req.extensions_mut().insert(AuthenticatedSession {
              user: validated.user,
              session_id: validated.session_id,
            });
          }
          Err(e) if e.is_internal() => {
            tracing::warn!(error = %e, "Session lookup failed, continuing anonymously");
          }
          Err(e) => tracing::debug!(error = %e, "Ignoring unusable session"),
        }
      }

      service.call(req).await
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::application::auth::test_support::{TestContext, test_context};
  use crate::application::auth::{RegisterUserCommand, RegisterUserUseCase};
  use actix_web::{App, HttpResponse, http::StatusCode, test, web};

  async fn greet(session: Option<AuthenticatedSession>) -> HttpResponse {
    match session {
      Some(session) => HttpResponse::Ok().body(format!("hello {}", session.user.email)),
      None => HttpResponse::Ok().body("hello stranger"),
    }
  }

  async fn register(ctx: &TestContext) -> String {
    RegisterUserUseCase::new(ctx.service.clone())
      .execute(RegisterUserCommand {
        email: "maybe@example.com".to_string(),
        password: "password123".to_string(),
        first_name: "May".to_string(),
        last_name: "Be".to_string(),
        role: "therapist".to_string(),
      })
      .await
      .unwrap()
      .session_id
  }

  async fn greeting_for(ctx: &TestContext, session_id: Option<&str>) -> (StatusCode, String) {
    let validate = Arc::new(ValidateSessionUseCase::new(ctx.service.clone()));
    let app = test::init_service(
      App::new()
        .wrap(OptionalSessionMiddleware::new(validate))
        .route("/", web::get().to(greet)),
    )
    .await;

    let mut req = test::TestRequest::get().uri("/");
    if let Some(session_id) = session_id {
      req = req.insert_header(("X-Session-ID", session_id.to_string()));
    }
    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    (status, String::from_utf8(body.to_vec()).unwrap())
  }

  #[actix_web::test]
  async fn test_valid_session_is_attached() {
    let ctx = test_context();
    let session_id = register(&ctx).await;

    let (status, body) = greeting_for(&ctx, Some(&session_id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello maybe@example.com");
  }

  #[actix_web::test]
  async fn test_anonymous_request_passes_through() {
    let ctx = test_context();

    let (status, body) = greeting_for(&ctx, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello stranger");
  }

  #[actix_web::test]
  async fn test_unknown_session_is_not_rejected() {
    let ctx = test_context();

    let (status, body) = greeting_for(&ctx, Some("no-such-session")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello stranger");
  }
}
