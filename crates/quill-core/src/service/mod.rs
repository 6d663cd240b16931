//! Application services - the engines behind the HTTP handlers.

mod blogs;
mod stats;

pub use blogs::{BlogPatch, BlogService, ListBlogsParams, NewBlog, Paginated};
pub use stats::StatsService;

#[cfg(test)]
mod tests;
