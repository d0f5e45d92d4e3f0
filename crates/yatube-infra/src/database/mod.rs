//! Database connection management and repository implementations.

mod connections;
pub mod entity;
mod memory;
mod postgres_base;
mod postgres_repo;

pub use connections::DatabaseConfig;
pub use memory::{InMemoryGroupRepository, InMemoryPostRepository, InMemoryUserRepository};
pub use postgres_repo::{PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository};

#[cfg(test)]
mod tests;
