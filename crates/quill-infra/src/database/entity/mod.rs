//! SeaORM entities for the blog store.

pub mod blog;
pub mod user;
