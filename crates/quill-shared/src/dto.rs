//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

use quill_core::domain::{Author, Blog, BlogWithAuthor, Stats};
use quill_core::service::{BlogPatch, NewBlog};

/// Request to create an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// A user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Blog creation payload. Fields stay optional so missing values reach the
/// mutation engine and come back as envelope validation errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl From<CreateBlogRequest> for NewBlog {
    fn from(req: CreateBlogRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            body: req.body,
            tags: req.tags,
        }
    }
}

/// Partial blog update; any subset of fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl From<UpdateBlogRequest> for BlogPatch {
    fn from(req: UpdateBlogRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            body: req.body,
            tags: req.tags,
        }
    }
}

/// Payload for PATCH /blogs/{id}/state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStateRequest {
    pub state: Option<String>,
}

/// Query parameters accepted by GET /blogs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBlogsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Free-text search over title and tags.
    pub author: Option<String>,
    pub title: Option<String>,
    /// Comma-separated tag set; blogs matching any are returned.
    pub tags: Option<String>,
    pub order_by: Option<String>,
    pub order: Option<String>,
}

/// Query parameters accepted by GET /blogs/me/posts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MyBlogsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub state: Option<String>,
}

/// Author display fields joined onto public blog reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<Author> for AuthorResponse {
    fn from(author: Author) -> Self {
        Self {
            id: author.id.to_string(),
            first_name: author.first_name,
            last_name: author.last_name,
            email: author.email,
        }
    }
}

/// A blog as returned to clients. `author` carries the joined display
/// fields on public reads and is omitted elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogResponse {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub body: String,
    pub author_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorResponse>,
    pub state: String,
    pub read_count: i64,
    pub reading_time: i32,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Blog> for BlogResponse {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id.to_string(),
            title: blog.title,
            description: blog.description,
            body: blog.body,
            author_id: blog.author.to_string(),
            author: None,
            state: blog.state.to_string(),
            read_count: blog.read_count,
            reading_time: blog.reading_time,
            tags: blog.tags,
            created_at: blog.created_at.to_rfc3339(),
            updated_at: blog.updated_at.to_rfc3339(),
        }
    }
}

impl From<BlogWithAuthor> for BlogResponse {
    fn from(joined: BlogWithAuthor) -> Self {
        let mut response = Self::from(joined.blog);
        response.author = joined.author.map(AuthorResponse::from);
        response
    }
}

/// Blog totals broken down by state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogTotals {
    pub total: u64,
    pub published: u64,
    pub drafts: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagStat {
    pub tag: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopAuthor {
    pub name: String,
    pub email: String,
    pub blog_count: u64,
}

/// GET /seed/stats payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub users: u64,
    pub blogs: BlogTotals,
    pub top_tags: Vec<TagStat>,
    pub top_authors: Vec<TopAuthor>,
}

impl From<Stats> for StatsResponse {
    fn from(stats: Stats) -> Self {
        Self {
            users: stats.users,
            blogs: BlogTotals {
                total: stats.blogs,
                published: stats.published,
                drafts: stats.drafts,
            },
            top_tags: stats
                .top_tags
                .into_iter()
                .map(|t| TagStat {
                    tag: t.tag,
                    count: t.count,
                })
                .collect(),
            top_authors: stats
                .top_authors
                .into_iter()
                .map(|a| TopAuthor {
                    name: a.name,
                    email: a.email,
                    blog_count: a.count,
                })
                .collect(),
        }
    }
}

/// POST /seed payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedRequest {
    pub user_count: Option<u64>,
    pub blog_count: Option<u64>,
}

/// POST /seed result summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSummary {
    pub users: u64,
    pub blogs: u64,
    pub published: u64,
    pub drafts: u64,
}
