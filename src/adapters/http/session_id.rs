use actix_web::HttpRequest;
use std::collections::HashMap;

/// Header carrying the session id directly
pub const SESSION_HEADER: &str = "X-Session-ID";
/// Cookie and query parameter name for the session id
pub const SESSION_PARAM: &str = "session_id";

/// Finds the session id a client presented
///
/// Sources are tried in order and empty values are skipped:
/// 1. `X-Session-ID` header
/// 2. `Authorization: Bearer <id>` header
/// 3. `session_id` cookie
/// 4. `session_id` query parameter
pub fn extract_session_id(req: &HttpRequest) -> Option<String> {
  from_session_header(req)
    .or_else(|| from_authorization(req))
    .or_else(|| from_cookie(req))
    .or_else(|| from_query(req))
}

fn non_empty(value: &str) -> Option<String> {
  let value = value.trim();
  (!value.is_empty()).then(|| value.to_string())
}

fn from_session_header(req: &HttpRequest) -> Option<String> {
  req
    .headers()
    .get(SESSION_HEADER)
    .and_then(|h| h.to_str().ok())
    .and_then(non_empty)
}

fn from_authorization(req: &HttpRequest) -> Option<String> {
  req
    .headers()
    .get("Authorization")
    .and_then(|h| h.to_str().ok())
    .and_then(|s| s.strip_prefix("Bearer "))
    .and_then(non_empty)
}

fn from_cookie(req: &HttpRequest) -> Option<String> {
  req
    .cookie(SESSION_PARAM)
    .and_then(|cookie| non_empty(cookie.value()))
}

fn from_query(req: &HttpRequest) -> Option<String> {
  serde_urlencoded::from_str::<HashMap<String, String>>(req.query_string())
    .ok()?
    .get(SESSION_PARAM)
    .and_then(|value| non_empty(value))
}
