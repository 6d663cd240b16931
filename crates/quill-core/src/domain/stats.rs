use serde::{Deserialize, Serialize};

/// Number of blogs carrying a given tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

/// Number of blogs written by a given author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorPostCount {
    pub name: String,
    pub email: String,
    pub count: u64,
}

/// Aggregate database statistics.
///
/// Ties in `top_tags` and `top_authors` are broken by tag name and author
/// email respectively, so repeated calls return a stable order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub users: u64,
    pub blogs: u64,
    pub published: u64,
    pub drafts: u64,
    pub top_tags: Vec<TagCount>,
    pub top_authors: Vec<AuthorPostCount>,
}
