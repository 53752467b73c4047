//! Session and credential lifecycle engine
//!
//! Registration, login, server-side sessions with expiry, logout (single
//! session or every device) and a password reset flow, arranged as
//! `domain` (entities, ports, [`AuthService`]), `application` (use cases),
//! `infrastructure` (Argon2, JWT, Postgres, Redis, config, tracing) and
//! `adapters` (actix-web middleware and error mapping).
//!
//! [`AuthService`]: domain::auth::AuthService

pub mod adapters;
pub mod application;
pub mod domain;
pub mod infrastructure;
