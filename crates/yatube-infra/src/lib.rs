//! # Yatube Infrastructure
//!
//! Concrete implementations of the ports defined in `yatube-core`:
//! SeaORM/Postgres repositories, in-memory repositories for db-less mode
//! and tests, and JWT + Argon2 authentication services.

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{
    DatabaseConfig, InMemoryGroupRepository, InMemoryPostRepository, InMemoryUserRepository,
    PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};
