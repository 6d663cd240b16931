//! Blog query and mutation engines.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Blog, BlogState, BlogWithAuthor, reading_time_minutes};
use crate::error::DomainError;
use crate::ports::{
    BlogFilter, BlogRepository, Page, PageRequest, SortField, SortOrder, SortSpec,
};

/// Listing parameters as they arrive from the request boundary, before
/// validation into the typed filter/sort specification.
#[derive(Debug, Clone, Default)]
pub struct ListBlogsParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Free-text search over title and tags (the `author` query parameter).
    pub search: Option<String>,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub order_by: Option<String>,
    pub order: Option<String>,
}

/// Payload for creating a blog. Fields are optional so that missing values
/// surface as validation errors rather than deserialization failures.
#[derive(Debug, Clone, Default)]
pub struct NewBlog {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Partial update: only provided fields are touched.
#[derive(Debug, Clone, Default)]
pub struct BlogPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A page of results with the metadata the response envelope carries.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

impl<T> Paginated<T> {
    fn new(page: Page<T>, request: PageRequest) -> Self {
        Self {
            pages: page.total.div_ceil(request.limit),
            total: page.total,
            items: page.items,
            page: request.page,
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// Query and mutation engine for blogs, layered over the repository port.
pub struct BlogService {
    blogs: Arc<dyn BlogRepository>,
}

impl BlogService {
    pub fn new(blogs: Arc<dyn BlogRepository>) -> Self {
        Self { blogs }
    }

    /// List published blogs with filtering, sorting and pagination.
    pub async fn list_published(
        &self,
        params: ListBlogsParams,
    ) -> Result<Paginated<BlogWithAuthor>, DomainError> {
        let filter = BlogFilter::published()
            .with_search(params.search)
            .with_title(params.title)
            .with_tags(params.tags);
        let sort = parse_sort(params.order_by.as_deref(), params.order.as_deref())?;
        let page = PageRequest::new(params.page, params.limit);

        let results = self.blogs.list_with_authors(&filter, sort, page).await?;
        Ok(Paginated::new(results, page))
    }

    /// Fetch one published blog, bumping its read count by exactly one.
    ///
    /// Drafts and unknown ids are indistinguishable to the public caller.
    pub async fn get_published(&self, id: Uuid) -> Result<BlogWithAuthor, DomainError> {
        self.blogs
            .find_published_and_bump_reads(id)
            .await?
            .ok_or_else(|| DomainError::blog_not_found(id))
    }

    /// List the caller's own blogs, newest first, optionally filtered by
    /// lifecycle state.
    pub async fn list_own(
        &self,
        author: Uuid,
        state: Option<&str>,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Paginated<Blog>, DomainError> {
        let state = state.map(parse_state).transpose()?;
        let page = PageRequest::new(page, limit);

        let results = self.blogs.list_by_author(author, state, page).await?;
        Ok(Paginated::new(results, page))
    }

    /// Create a draft owned by `author`.
    pub async fn create(&self, author: Uuid, new_blog: NewBlog) -> Result<Blog, DomainError> {
        let title = require_text(new_blog.title, "Title")?;
        let body = match new_blog.body {
            Some(body) if !body.is_empty() => body,
            _ => return Err(DomainError::validation("Body is required")),
        };
        self.ensure_title_free(&title).await?;

        let description = new_blog.description.map(|d| d.trim().to_string());
        let tags = trim_tags(new_blog.tags.unwrap_or_default());

        let blog = Blog::new(author, title, description, body, tags);
        tracing::debug!(blog_id = %blog.id, author = %author, "Creating blog");
        Ok(self.blogs.insert(blog).await?)
    }

    /// Apply a partial update to the caller's blog. The reading time is
    /// re-derived iff `body` is part of the patch.
    pub async fn update(
        &self,
        caller: Uuid,
        id: Uuid,
        patch: BlogPatch,
    ) -> Result<Blog, DomainError> {
        let mut blog = self.fetch_owned(caller, id, "update").await?;

        if let Some(title) = patch.title {
            let title = require_text(Some(title), "Title")?;
            if title != blog.title {
                self.ensure_title_free(&title).await?;
            }
            blog.title = title;
        }
        if let Some(body) = &patch.body
            && body.is_empty()
        {
            return Err(DomainError::validation("Body is required"));
        }

        if let Some(description) = patch.description {
            blog.description = Some(description.trim().to_string());
        }
        if let Some(body) = patch.body {
            blog.reading_time = reading_time_minutes(&body);
            blog.body = body;
        }
        if let Some(tags) = patch.tags {
            blog.tags = trim_tags(tags);
        }
        blog.updated_at = chrono::Utc::now();

        Ok(self.blogs.update(blog).await?)
    }

    /// Move the caller's blog between draft and published. Both directions
    /// are allowed.
    pub async fn set_state(
        &self,
        caller: Uuid,
        id: Uuid,
        state: Option<&str>,
    ) -> Result<Blog, DomainError> {
        let mut blog = self.fetch_owned(caller, id, "update").await?;

        let state = parse_state(state.unwrap_or_default())?;

        blog.state = state;
        blog.updated_at = chrono::Utc::now();
        Ok(self.blogs.update(blog).await?)
    }

    /// Permanently delete the caller's blog.
    pub async fn delete(&self, caller: Uuid, id: Uuid) -> Result<(), DomainError> {
        let blog = self.fetch_owned(caller, id, "delete").await?;

        tracing::debug!(blog_id = %blog.id, "Deleting blog");
        Ok(self.blogs.delete(blog.id).await?)
    }

    /// Existence before ownership: a missing blog is NotFound for everyone,
    /// someone else's blog is Forbidden, and only then is the payload looked
    /// at.
    async fn fetch_owned(
        &self,
        caller: Uuid,
        id: Uuid,
        action: &str,
    ) -> Result<Blog, DomainError> {
        let blog = self
            .blogs
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::blog_not_found(id))?;

        if !blog.is_owned_by(caller) {
            return Err(DomainError::Forbidden(format!(
                "Not authorized to {action} this blog"
            )));
        }
        Ok(blog)
    }

    async fn ensure_title_free(&self, title: &str) -> Result<(), DomainError> {
        if self.blogs.title_exists(title).await? {
            return Err(DomainError::validation(format!(
                "A blog titled '{title}' already exists"
            )));
        }
        Ok(())
    }
}

fn parse_sort(order_by: Option<&str>, order: Option<&str>) -> Result<SortSpec, DomainError> {
    let field = match order_by {
        Some(raw) => raw
            .parse::<SortField>()
            .map_err(|_| DomainError::validation(format!("Cannot sort by '{raw}'")))?,
        None => SortField::default(),
    };
    let order = order.map(SortOrder::parse).unwrap_or_default();
    Ok(SortSpec { field, order })
}

fn parse_state(raw: &str) -> Result<BlogState, DomainError> {
    raw.parse().map_err(|_| {
        DomainError::validation("Invalid state. Must be either draft or published")
    })
}

fn require_text(value: Option<String>, field: &str) -> Result<String, DomainError> {
    match value.map(|v| v.trim().to_string()) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(DomainError::validation(format!("{field} is required"))),
    }
}

fn trim_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
