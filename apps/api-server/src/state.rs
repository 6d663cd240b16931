//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{BlogRepository, PasswordService, UserRepository};
use quill_core::service::{BlogService, StatsService};
use quill_infra::database::{
    DatabaseConfig, DatabaseConnections, DbErr, PostgresBlogRepository, PostgresUserRepository,
};
use quill_infra::seed::Seeder;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub blogs: Arc<BlogService>,
    pub stats: Arc<StatsService>,
    pub seeder: Arc<Seeder>,
    pub is_production: bool,
}

impl AppState {
    /// Connect to the database and wire the repositories into the services.
    pub async fn new(
        db_config: &DatabaseConfig,
        config: &AppConfig,
        passwords: Arc<dyn PasswordService>,
    ) -> Result<Self, DbErr> {
        let connections = DatabaseConnections::init(db_config).await?;

        let users: Arc<dyn UserRepository> =
            Arc::new(PostgresUserRepository::new(connections.main.clone()));
        let blog_repo: Arc<dyn BlogRepository> =
            Arc::new(PostgresBlogRepository::new(connections.main.clone()));

        let blogs = Arc::new(BlogService::new(blog_repo.clone()));
        let stats = Arc::new(StatsService::new(users.clone(), blog_repo.clone()));
        let seeder = Arc::new(Seeder::new(users.clone(), blog_repo, passwords));

        tracing::info!("Application state initialized");

        Ok(Self {
            users,
            blogs,
            stats,
            seeder,
            is_production: config.is_production(),
        })
    }
}
