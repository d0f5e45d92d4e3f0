//! SeaORM entities mapping the relational schema.

pub mod group;
pub mod post;
pub mod user;
