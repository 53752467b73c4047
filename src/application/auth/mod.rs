//! Authentication use cases
//!
//! This module contains all authentication-related use cases that orchestrate
//! domain services to implement application-specific workflows. Use cases take
//! raw request strings, turn them into value objects, and shape the engine's
//! results into responses that carry no credential material.

mod get_session;
mod login_user;
mod logout_all_devices;
mod logout_user;
mod refresh_session;
mod register_user;
mod request_password_reset;
mod reset_password;
mod set_account_active;
mod validate_session;

pub use get_session::{GetSessionUseCase, SessionView};
pub use login_user::{LoginUserCommand, LoginUserResponse, LoginUserUseCase};
pub use logout_all_devices::{LogoutAllDevicesResponse, LogoutAllDevicesUseCase};
pub use logout_user::LogoutUserUseCase;
pub use refresh_session::RefreshSessionUseCase;
pub use register_user::{RegisterUserCommand, RegisterUserResponse, RegisterUserUseCase};
pub use request_password_reset::{RequestPasswordResetCommand, RequestPasswordResetUseCase};
pub use reset_password::{ResetPasswordCommand, ResetPasswordUseCase};
pub use set_account_active::SetAccountActiveUseCase;
pub use validate_session::{ValidateSessionResponse, ValidateSessionUseCase};
