//! Statistics aggregator.

use std::sync::Arc;

use crate::domain::{BlogState, Stats};
use crate::error::DomainError;
use crate::ports::{BlogRepository, UserRepository};

const TOP_TAGS: u64 = 10;
const TOP_AUTHORS: u64 = 5;

/// Aggregates tag-frequency and per-author post-count summaries.
pub struct StatsService {
    users: Arc<dyn UserRepository>,
    blogs: Arc<dyn BlogRepository>,
}

impl StatsService {
    pub fn new(users: Arc<dyn UserRepository>, blogs: Arc<dyn BlogRepository>) -> Self {
        Self { users, blogs }
    }

    pub async fn stats(&self) -> Result<Stats, DomainError> {
        Ok(Stats {
            users: self.users.count().await?,
            blogs: self.blogs.count_by_state(None).await?,
            published: self
                .blogs
                .count_by_state(Some(BlogState::Published))
                .await?,
            drafts: self.blogs.count_by_state(Some(BlogState::Draft)).await?,
            top_tags: self.blogs.top_tags(TOP_TAGS).await?,
            top_authors: self.blogs.top_authors(TOP_AUTHORS).await?,
        })
    }
}
