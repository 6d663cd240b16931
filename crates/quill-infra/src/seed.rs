//! Demo-data seeder: sample users and randomized draft/published blogs.
//!
//! Meant for local demos and load experiments only; the API layer refuses to
//! run it in production.

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;

use quill_core::domain::{Blog, BlogState, User};
use quill_core::error::RepoError;
use quill_core::ports::{BlogRepository, PasswordService, UserRepository};

/// Every seeded account logs in with this password.
const SEED_PASSWORD: &str = "password123";

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Margaret", "Dennis", "Radia", "Ken",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Hamilton", "Ritchie",
    "Perlman", "Thompson",
];

const TOPICS: &[&str] = &[
    "Understanding Ownership",
    "Async Pitfalls",
    "Indexes in Practice",
    "A Tour of Tracing",
    "Zero-Downtime Deploys",
    "Error Handling Notes",
    "Pagination Done Right",
    "Testing Without Mocks",
];

const TAG_POOL: &[&str] = &[
    "rust", "postgres", "devops", "nodejs", "testing", "web", "cloud", "databases",
];

const WORDS: &[&str] = &[
    "the", "quick", "service", "request", "index", "query", "latency", "deploy", "cache",
    "schema", "token", "stream", "worker", "retry", "batch", "commit", "branch", "merge",
];

/// Summary of one seeding run.
#[derive(Debug, Clone, Copy)]
pub struct SeedReport {
    pub users: u64,
    pub blogs: u64,
    pub published: u64,
    pub drafts: u64,
}

/// Generates demo users and blogs through the repository ports.
pub struct Seeder {
    users: Arc<dyn UserRepository>,
    blogs: Arc<dyn BlogRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl Seeder {
    pub fn new(
        users: Arc<dyn UserRepository>,
        blogs: Arc<dyn BlogRepository>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            blogs,
            passwords,
        }
    }

    pub async fn seed(&self, user_count: u64, blog_count: u64) -> Result<SeedReport, RepoError> {
        // One hash shared across all demo accounts; hashing is by far the
        // slowest part of seeding.
        let password_hash = self
            .passwords
            .hash(SEED_PASSWORD)
            .map_err(|e| RepoError::Query(e.to_string()))?;

        let mut rng = rand::thread_rng();

        let mut users = Vec::with_capacity(user_count as usize);
        for i in 0..user_count {
            let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
            let email = format!(
                "{}.{}.{}@example.com",
                first.to_lowercase(),
                last.to_lowercase(),
                i
            );
            let user = User::new(
                first.to_string(),
                last.to_string(),
                email,
                password_hash.clone(),
            );
            users.push(self.users.insert(user).await?);
        }

        let mut published = 0u64;
        let mut drafts = 0u64;
        if !users.is_empty() {
            for i in 0..blog_count {
                let author = users[rng.gen_range(0..users.len())].id;
                let topic = TOPICS[rng.gen_range(0..TOPICS.len())];
                let title = format!("{} #{}", topic, i + 1);
                let body = random_body(&mut rng);
                let tag_count = rng.gen_range(1..=3);
                let tags = TAG_POOL
                    .choose_multiple(&mut rng, tag_count)
                    .map(|t| t.to_string())
                    .collect();

                let mut blog = Blog::new(
                    author,
                    title,
                    Some(format!("Notes on {}", topic.to_lowercase())),
                    body,
                    tags,
                );
                if rng.gen_bool(0.7) {
                    blog.state = BlogState::Published;
                    blog.read_count = rng.gen_range(0..500);
                    published += 1;
                } else {
                    drafts += 1;
                }
                self.blogs.insert(blog).await?;
            }
        }

        let report = SeedReport {
            users: users.len() as u64,
            blogs: published + drafts,
            published,
            drafts,
        };
        tracing::info!(
            users = report.users,
            blogs = report.blogs,
            "Database seeded"
        );
        Ok(report)
    }

    /// Remove every blog and user.
    pub async fn clear(&self) -> Result<(), RepoError> {
        let blogs = self.blogs.delete_all().await?;
        let users = self.users.delete_all().await?;
        tracing::info!(blogs, users, "Database cleared");
        Ok(())
    }
}

fn random_body(rng: &mut impl Rng) -> String {
    let word_count = rng.gen_range(80..=1200);
    let mut body = String::new();
    for i in 0..word_count {
        if i > 0 {
            body.push(' ');
        }
        body.push_str(WORDS[rng.gen_range(0..WORDS.len())]);
    }
    body
}
