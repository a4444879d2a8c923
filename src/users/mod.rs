#[cfg(test)]
pub mod memory;
pub mod model;
pub mod repo;

pub use model::User;
pub use repo::{PgUserRepository, UserRepository};
