use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Words per minute used to derive `reading_time`.
const WORDS_PER_MINUTE: usize = 200;

/// Estimated minutes to read `body`, rounded up.
///
/// Tokens are whitespace-separated runs; an empty body reads in zero minutes.
pub fn reading_time_minutes(body: &str) -> i32 {
    body.split_whitespace().count().div_ceil(WORDS_PER_MINUTE) as i32
}

/// Lifecycle state of a blog. Newly created blogs start as drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogState {
    #[default]
    Draft,
    Published,
}

impl BlogState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogState::Draft => "draft",
            BlogState::Published => "published",
        }
    }
}

impl fmt::Display for BlogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlogState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(BlogState::Draft),
            "published" => Ok(BlogState::Published),
            _ => Err(()),
        }
    }
}

/// Blog entity - one post, owned by its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub body: String,
    /// Owning user's id. Immutable after creation; ownership checks compare
    /// this value against the caller's id.
    pub author: Uuid,
    pub state: BlogState,
    pub read_count: i64,
    /// Derived from `body`, never set by callers.
    pub reading_time: i32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Blog {
    /// Create a new draft with a derived reading time.
    pub fn new(
        author: Uuid,
        title: String,
        description: Option<String>,
        body: String,
        tags: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        let reading_time = reading_time_minutes(&body);
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            body,
            author,
            state: BlogState::Draft,
            read_count: 0,
            reading_time,
            tags,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.author == user_id
    }
}

/// A blog joined with its author's display fields, as returned by the
/// public listing and retrieval paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogWithAuthor {
    pub blog: Blog,
    /// `None` if the author row has since been removed.
    pub author: Option<super::Author>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time_minutes(&words(400)), 2);
        assert_eq!(reading_time_minutes(&words(150)), 1);
        assert_eq!(reading_time_minutes(&words(200)), 1);
        assert_eq!(reading_time_minutes(&words(201)), 2);
    }

    #[test]
    fn reading_time_splits_on_whitespace_runs() {
        assert_eq!(reading_time_minutes("one\n\ttwo   three"), 1);
        assert_eq!(reading_time_minutes(""), 0);
    }

    #[test]
    fn new_blog_is_a_draft_with_derived_reading_time() {
        let blog = Blog::new(
            Uuid::new_v4(),
            "Intro to X".to_string(),
            None,
            words(250),
            vec!["rust".to_string()],
        );
        assert_eq!(blog.state, BlogState::Draft);
        assert_eq!(blog.read_count, 0);
        assert_eq!(blog.reading_time, 2);
    }

    #[test]
    fn state_round_trips_through_strings() {
        assert_eq!("draft".parse(), Ok(BlogState::Draft));
        assert_eq!("published".parse(), Ok(BlogState::Published));
        assert!("archived".parse::<BlogState>().is_err());
        assert_eq!(BlogState::Published.to_string(), "published");
    }
}
