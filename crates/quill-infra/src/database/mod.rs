//! Database connection management and repository implementations.

mod connections;

pub mod entity;
pub mod postgres_repo;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use sea_orm::DbErr;
pub use postgres_repo::{PostgresBlogRepository, PostgresUserRepository};

#[cfg(test)]
mod tests;
