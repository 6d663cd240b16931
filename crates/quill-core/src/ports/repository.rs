use std::str::FromStr;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AuthorPostCount, Blog, BlogState, BlogWithAuthor, TagCount, User};
use crate::error::RepoError;

/// Typed filter specification for blog listings.
///
/// Replaces ad-hoc query objects: only these enumerated fields ever reach
/// the persistence adapter.
#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    pub state: Option<BlogState>,
    /// Free-text search over title and tags.
    pub search: Option<String>,
    /// Case-insensitive substring match on the title.
    pub title: Option<String>,
    /// Match blogs whose tag set intersects this set.
    pub tags: Option<Vec<String>>,
}

impl BlogFilter {
    pub fn published() -> Self {
        Self {
            state: Some(BlogState::Published),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|s| !s.is_empty());
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title.filter(|t| !t.is_empty());
        self
    }

    pub fn with_tags(mut self, tags: Option<Vec<String>>) -> Self {
        self.tags = tags.filter(|t| !t.is_empty());
        self
    }
}

/// Fields a listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    ReadCount,
    ReadingTime,
}

impl FromStr for SortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            "title" => Ok(SortField::Title),
            "read_count" => Ok(SortField::ReadCount),
            "reading_time" => Ok(SortField::ReadingTime),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// `asc` selects ascending; anything else means descending.
    pub fn parse(s: &str) -> Self {
        if s == "asc" {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

/// Sort specification; defaults to newest-first.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

/// One page of a listing.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u64 = 20;

    /// Build a page request, treating missing or non-positive values as the
    /// defaults (page 1, limit 20).
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            limit: limit.filter(|l| *l > 0).unwrap_or(Self::DEFAULT_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A page of results plus the total number of matching rows.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// User repository.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> Result<User, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    /// Remove every user. Demo tooling only.
    async fn delete_all(&self) -> Result<u64, RepoError>;
}

/// Blog repository - filtering, sorting, pagination and the atomic
/// read-count increment live behind this trait.
#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn insert(&self, blog: Blog) -> Result<Blog, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>, RepoError>;

    /// Persist the given blog over its stored row.
    async fn update(&self, blog: Blog) -> Result<Blog, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    async fn title_exists(&self, title: &str) -> Result<bool, RepoError>;

    /// Filtered, sorted, paginated listing joined with author display fields.
    async fn list_with_authors(
        &self,
        filter: &BlogFilter,
        sort: SortSpec,
        page: PageRequest,
    ) -> Result<Page<BlogWithAuthor>, RepoError>;

    /// One author's blogs, newest first, optionally restricted by state.
    async fn list_by_author(
        &self,
        author: Uuid,
        state: Option<BlogState>,
        page: PageRequest,
    ) -> Result<Page<Blog>, RepoError>;

    /// Atomically increment `read_count` on the published blog with this id
    /// and return the post-increment row, or `None` if no such row exists.
    ///
    /// Must be a single read-modify-write in the store so concurrent readers
    /// never lose increments.
    async fn find_published_and_bump_reads(
        &self,
        id: Uuid,
    ) -> Result<Option<BlogWithAuthor>, RepoError>;

    async fn count_by_state(&self, state: Option<BlogState>) -> Result<u64, RepoError>;

    /// Most-used tags, descending by count, ties broken by tag name.
    async fn top_tags(&self, limit: u64) -> Result<Vec<TagCount>, RepoError>;

    /// Most prolific authors, descending by post count, ties broken by email.
    async fn top_authors(&self, limit: u64) -> Result<Vec<AuthorPostCount>, RepoError>;

    /// Remove every blog. Demo tooling only.
    async fn delete_all(&self) -> Result<u64, RepoError>;
}
