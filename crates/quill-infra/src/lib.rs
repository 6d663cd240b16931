//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! PostgreSQL repositories via SeaORM, JWT + Argon2 authentication, and the
//! demo-data seeder.

pub mod auth;
pub mod database;
pub mod seed;

pub use auth::{Argon2PasswordService, JwtTokenService};
pub use database::DatabaseConnections;
