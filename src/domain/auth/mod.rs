pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{PublicUser, Session, User};
pub use errors::{AuthError, HashError, RepositoryError, TokenError, ValidationError};
pub use services::{AuthOutcome, AuthService, AuthServiceConfig, AuthServiceDependencies, NewUser};
pub use value_objects::{
  Email, Password, PasswordHash, ResetToken, SessionId, TokenHash, UserRole, ValueObjectError,
};
