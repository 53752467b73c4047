mod argon2_hasher;
mod jwt_issuer;
mod token_generator;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt_issuer::JwtBearerIssuer;
pub use token_generator::SecureTokenGenerator;
