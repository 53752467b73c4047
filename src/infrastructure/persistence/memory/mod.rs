//! Process-local stores for tests and single-node development setups

mod session_repository;
mod user_repository;

pub use session_repository::InMemorySessionRepository;
pub use user_repository::InMemoryUserRepository;
