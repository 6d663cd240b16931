//! Service tests against an in-memory repository double.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::{
    Author, AuthorPostCount, Blog, BlogState, BlogWithAuthor, Stats, TagCount, User,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{
    BlogFilter, BlogRepository, Page, PageRequest, SortField, SortOrder, SortSpec, UserRepository,
};
use crate::service::{BlogPatch, BlogService, ListBlogsParams, NewBlog, StatsService};

/// In-memory store backing both repository ports.
#[derive(Default)]
struct MemoryStore {
    users: Mutex<Vec<User>>,
    blogs: Mutex<Vec<Blog>>,
}

impl MemoryStore {
    fn author_of(&self, blog: &Blog) -> Option<Author> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == blog.author)
            .cloned()
            .map(Author::from)
    }

    fn matches(blog: &Blog, filter: &BlogFilter) -> bool {
        if let Some(state) = filter.state
            && blog.state != state
        {
            return false;
        }
        if let Some(search) = &filter.search {
            let in_title = blog
                .title
                .to_lowercase()
                .contains(&search.to_lowercase());
            let in_tags = blog.tags.iter().any(|t| t == search);
            if !in_title && !in_tags {
                return false;
            }
        }
        if let Some(title) = &filter.title
            && !blog.title.to_lowercase().contains(&title.to_lowercase())
        {
            return false;
        }
        if let Some(tags) = &filter.tags
            && !blog.tags.iter().any(|t| tags.contains(t))
        {
            return false;
        }
        true
    }

    fn sort(blogs: &mut [Blog], sort: SortSpec) {
        blogs.sort_by(|a, b| {
            let ord = match sort.field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortField::Title => a.title.cmp(&b.title),
                SortField::ReadCount => a.read_count.cmp(&b.read_count),
                SortField::ReadingTime => a.reading_time.cmp(&b.reading_time),
            };
            match sort.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }

    fn paginate(blogs: Vec<Blog>, page: PageRequest) -> Page<Blog> {
        let total = blogs.len() as u64;
        let items = blogs
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Page { items, total }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: User) -> Result<User, RepoError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.users.lock().unwrap().len() as u64)
    }

    async fn delete_all(&self) -> Result<u64, RepoError> {
        let mut users = self.users.lock().unwrap();
        let removed = users.len() as u64;
        users.clear();
        Ok(removed)
    }
}

#[async_trait]
impl BlogRepository for MemoryStore {
    async fn insert(&self, blog: Blog) -> Result<Blog, RepoError> {
        let mut blogs = self.blogs.lock().unwrap();
        if blogs.iter().any(|b| b.title == blog.title) {
            return Err(RepoError::Constraint("duplicate title".to_string()));
        }
        blogs.push(blog.clone());
        Ok(blog)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>, RepoError> {
        Ok(self
            .blogs
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn update(&self, blog: Blog) -> Result<Blog, RepoError> {
        let mut blogs = self.blogs.lock().unwrap();
        let row = blogs
            .iter_mut()
            .find(|b| b.id == blog.id)
            .ok_or(RepoError::NotFound)?;
        *row = blog.clone();
        Ok(blog)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut blogs = self.blogs.lock().unwrap();
        let before = blogs.len();
        blogs.retain(|b| b.id != id);
        if blogs.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn title_exists(&self, title: &str) -> Result<bool, RepoError> {
        Ok(self.blogs.lock().unwrap().iter().any(|b| b.title == title))
    }

    async fn list_with_authors(
        &self,
        filter: &BlogFilter,
        sort: SortSpec,
        page: PageRequest,
    ) -> Result<Page<BlogWithAuthor>, RepoError> {
        let mut rows: Vec<Blog> = self
            .blogs
            .lock()
            .unwrap()
            .iter()
            .filter(|b| Self::matches(b, filter))
            .cloned()
            .collect();
        Self::sort(&mut rows, sort);
        let page = Self::paginate(rows, page);
        let items = page
            .items
            .into_iter()
            .map(|blog| {
                let author = self.author_of(&blog);
                BlogWithAuthor { blog, author }
            })
            .collect();
        Ok(Page {
            items,
            total: page.total,
        })
    }

    async fn list_by_author(
        &self,
        author: Uuid,
        state: Option<BlogState>,
        page: PageRequest,
    ) -> Result<Page<Blog>, RepoError> {
        let mut rows: Vec<Blog> = self
            .blogs
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.author == author && state.is_none_or(|s| b.state == s))
            .cloned()
            .collect();
        Self::sort(
            &mut rows,
            SortSpec {
                field: SortField::CreatedAt,
                order: SortOrder::Desc,
            },
        );
        Ok(Self::paginate(rows, page))
    }

    async fn find_published_and_bump_reads(
        &self,
        id: Uuid,
    ) -> Result<Option<BlogWithAuthor>, RepoError> {
        let bumped = {
            let mut blogs = self.blogs.lock().unwrap();
            match blogs
                .iter_mut()
                .find(|b| b.id == id && b.state == BlogState::Published)
            {
                Some(blog) => {
                    blog.read_count += 1;
                    Some(blog.clone())
                }
                None => None,
            }
        };
        Ok(bumped.map(|blog| {
            let author = self.author_of(&blog);
            BlogWithAuthor { blog, author }
        }))
    }

    async fn count_by_state(&self, state: Option<BlogState>) -> Result<u64, RepoError> {
        Ok(self
            .blogs
            .lock()
            .unwrap()
            .iter()
            .filter(|b| state.is_none_or(|s| b.state == s))
            .count() as u64)
    }

    async fn top_tags(&self, limit: u64) -> Result<Vec<TagCount>, RepoError> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for blog in self.blogs.lock().unwrap().iter() {
            for tag in &blog.tags {
                *counts.entry(tag.clone()).or_default() += 1;
            }
        }
        let mut tags: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then(a.tag.cmp(&b.tag)));
        tags.truncate(limit as usize);
        Ok(tags)
    }

    async fn top_authors(&self, limit: u64) -> Result<Vec<AuthorPostCount>, RepoError> {
        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        for blog in self.blogs.lock().unwrap().iter() {
            *counts.entry(blog.author).or_default() += 1;
        }
        let users = self.users.lock().unwrap();
        let mut authors: Vec<AuthorPostCount> = counts
            .into_iter()
            .filter_map(|(id, count)| {
                users.iter().find(|u| u.id == id).map(|u| AuthorPostCount {
                    name: u.display_name(),
                    email: u.email.clone(),
                    count,
                })
            })
            .collect();
        authors.sort_by(|a, b| b.count.cmp(&a.count).then(a.email.cmp(&b.email)));
        authors.truncate(limit as usize);
        Ok(authors)
    }

    async fn delete_all(&self) -> Result<u64, RepoError> {
        let mut blogs = self.blogs.lock().unwrap();
        let removed = blogs.len() as u64;
        blogs.clear();
        Ok(removed)
    }
}

fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

fn service() -> (Arc<MemoryStore>, BlogService) {
    let store = Arc::new(MemoryStore::default());
    let service = BlogService::new(store.clone());
    (store, service)
}

fn new_blog(title: &str, body: String) -> NewBlog {
    NewBlog {
        title: Some(title.to_string()),
        body: Some(body),
        ..NewBlog::default()
    }
}

async fn seed_published(store: &Arc<MemoryStore>, author: Uuid, title: &str, tags: &[&str]) -> Blog {
    let mut blog = Blog::new(
        author,
        title.to_string(),
        None,
        words(10),
        tags.iter().map(|t| t.to_string()).collect(),
    );
    blog.state = BlogState::Published;
    BlogRepository::insert(store.as_ref(), blog).await.unwrap()
}

#[tokio::test]
async fn create_derives_reading_time() {
    let (_, service) = service();
    let author = Uuid::new_v4();

    let long = service
        .create(author, new_blog("Long read", words(400)))
        .await
        .unwrap();
    assert_eq!(long.reading_time, 2);
    assert_eq!(long.state, BlogState::Draft);
    assert_eq!(long.read_count, 0);

    let short = service
        .create(author, new_blog("Short read", words(150)))
        .await
        .unwrap();
    assert_eq!(short.reading_time, 1);
}

#[tokio::test]
async fn create_requires_title_and_body() {
    let (_, service) = service();
    let author = Uuid::new_v4();

    let err = service
        .create(author, NewBlog { body: Some(words(5)), ..NewBlog::default() })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref msg) if msg.contains("Title")));

    let err = service
        .create(author, NewBlog { title: Some("No body".to_string()), ..NewBlog::default() })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref msg) if msg.contains("Body")));
}

#[tokio::test]
async fn duplicate_title_is_a_validation_error() {
    let (_, service) = service();
    let author = Uuid::new_v4();

    service
        .create(author, new_blog("Intro to X", words(20)))
        .await
        .unwrap();
    let err = service
        .create(Uuid::new_v4(), new_blog("Intro to X", words(30)))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation(ref msg) if msg.contains("Intro to X")));
}

#[tokio::test]
async fn update_recomputes_reading_time_only_when_body_changes() {
    let (_, service) = service();
    let author = Uuid::new_v4();
    let blog = service
        .create(author, new_blog("Patchable", words(150)))
        .await
        .unwrap();

    let patched = service
        .update(
            author,
            blog.id,
            BlogPatch {
                title: Some("Patchable, revised".to_string()),
                ..BlogPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.reading_time, 1);

    let patched = service
        .update(
            author,
            blog.id,
            BlogPatch {
                body: Some(words(450)),
                ..BlogPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.reading_time, 3);
}

#[tokio::test]
async fn mutations_by_non_owner_are_forbidden() {
    let (_, service) = service();
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let blog = service
        .create(owner, new_blog("Owned", words(10)))
        .await
        .unwrap();

    let err = service
        .update(stranger, blog.id, BlogPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    // Ownership is checked before the payload: an invalid state from a
    // stranger is still Forbidden, not Validation.
    let err = service
        .set_state(stranger, blog.id, Some("archived"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let err = service.delete(stranger, blog.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
}

#[tokio::test]
async fn missing_blog_is_not_found_before_any_validation() {
    let (_, service) = service();

    let err = service
        .set_state(Uuid::new_v4(), Uuid::new_v4(), Some("archived"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn set_state_validates_value_for_the_owner() {
    let (_, service) = service();
    let owner = Uuid::new_v4();
    let blog = service
        .create(owner, new_blog("Stateful", words(10)))
        .await
        .unwrap();

    let err = service
        .set_state(owner, blog.id, Some("archived"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref msg) if msg.contains("draft or published")));

    let published = service
        .set_state(owner, blog.id, Some("published"))
        .await
        .unwrap();
    assert_eq!(published.state, BlogState::Published);

    // published -> draft is allowed
    let drafted = service
        .set_state(owner, blog.id, Some("draft"))
        .await
        .unwrap();
    assert_eq!(drafted.state, BlogState::Draft);
}

#[tokio::test]
async fn delete_removes_the_blog() {
    let (store, service) = service();
    let owner = Uuid::new_v4();
    let blog = service
        .create(owner, new_blog("Doomed", words(10)))
        .await
        .unwrap();

    service.delete(owner, blog.id).await.unwrap();
    assert!(
        BlogRepository::find_by_id(store.as_ref(), blog.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn public_fetch_bumps_read_count_once_per_call() {
    let (store, service) = service();
    let blog = seed_published(&store, Uuid::new_v4(), "Popular", &[]).await;

    let first = service.get_published(blog.id).await.unwrap();
    let second = service.get_published(blog.id).await.unwrap();

    assert_eq!(first.blog.read_count, 1);
    assert_eq!(second.blog.read_count, first.blog.read_count + 1);
}

#[tokio::test]
async fn drafts_are_not_found_through_the_public_path() {
    let (_, service) = service();
    let owner = Uuid::new_v4();
    let draft = service
        .create(owner, new_blog("Hidden draft", words(10)))
        .await
        .unwrap();

    let err = service.get_published(draft.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn listing_only_returns_published_blogs() {
    let (store, service) = service();
    let author = Uuid::new_v4();
    seed_published(&store, author, "Visible", &[]).await;
    service
        .create(author, new_blog("Invisible", words(10)))
        .await
        .unwrap();

    let page = service
        .list_published(ListBlogsParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].blog.title, "Visible");
}

#[tokio::test]
async fn tag_filter_matches_any_intersection() {
    let (store, service) = service();
    let author = Uuid::new_v4();
    seed_published(&store, author, "Node piece", &["nodejs"]).await;
    seed_published(&store, author, "Ops piece", &["devops", "cloud"]).await;
    seed_published(&store, author, "Rust piece", &["rust"]).await;

    let page = service
        .list_published(ListBlogsParams {
            tags: Some(vec!["nodejs".to_string(), "devops".to_string()]),
            ..ListBlogsParams::default()
        })
        .await
        .unwrap();

    let mut titles: Vec<_> = page.items.iter().map(|b| b.blog.title.clone()).collect();
    titles.sort();
    assert_eq!(titles, vec!["Node piece", "Ops piece"]);
}

#[tokio::test]
async fn title_filter_is_a_case_insensitive_substring() {
    let (store, service) = service();
    seed_published(&store, Uuid::new_v4(), "Intro to Quill", &[]).await;
    seed_published(&store, Uuid::new_v4(), "Unrelated", &[]).await;

    let page = service
        .list_published(ListBlogsParams {
            title: Some("quill".to_string()),
            ..ListBlogsParams::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].blog.title, "Intro to Quill");
}

#[tokio::test]
async fn sorting_by_read_count_ascending() {
    let (store, service) = service();
    let author = Uuid::new_v4();
    let busy = seed_published(&store, author, "Busy", &[]).await;
    seed_published(&store, author, "Quiet", &[]).await;
    service.get_published(busy.id).await.unwrap();
    service.get_published(busy.id).await.unwrap();

    let page = service
        .list_published(ListBlogsParams {
            order_by: Some("read_count".to_string()),
            order: Some("asc".to_string()),
            ..ListBlogsParams::default()
        })
        .await
        .unwrap();

    let counts: Vec<i64> = page.items.iter().map(|b| b.blog.read_count).collect();
    assert_eq!(counts, vec![0, 2]);
}

#[tokio::test]
async fn unknown_sort_field_is_rejected() {
    let (_, service) = service();

    let err = service
        .list_published(ListBlogsParams {
            order_by: Some("password_hash".to_string()),
            ..ListBlogsParams::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn pagination_metadata_and_out_of_range_pages() {
    let (store, service) = service();
    let author = Uuid::new_v4();
    for i in 0..5 {
        seed_published(&store, author, &format!("Post {i}"), &[]).await;
    }

    let page = service
        .list_published(ListBlogsParams {
            limit: Some(2),
            ..ListBlogsParams::default()
        })
        .await
        .unwrap();
    assert_eq!(page.count(), 2);
    assert_eq!(page.total, 5);
    assert_eq!(page.pages, 3);

    let beyond = service
        .list_published(ListBlogsParams {
            page: Some(7),
            limit: Some(2),
            ..ListBlogsParams::default()
        })
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 5);
    assert_eq!(beyond.page, 7);
}

#[tokio::test]
async fn own_listing_filters_by_state_and_sorts_newest_first() {
    let (store, service) = service();
    let author = Uuid::new_v4();

    let mut old = Blog::new(author, "Older".to_string(), None, words(5), vec![]);
    old.created_at = Utc::now() - Duration::hours(1);
    BlogRepository::insert(store.as_ref(), old).await.unwrap();
    service
        .create(author, new_blog("Newer", words(5)))
        .await
        .unwrap();
    seed_published(&store, author, "Published one", &[]).await;
    seed_published(&store, Uuid::new_v4(), "Someone else's", &[]).await;

    let all = service.list_own(author, None, None, None).await.unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.items.last().unwrap().title, "Older");

    let drafts = service
        .list_own(author, Some("draft"), None, None)
        .await
        .unwrap();
    assert_eq!(drafts.total, 2);

    let err = service
        .list_own(author, Some("pending"), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn stats_aggregates_counts_tags_and_authors() {
    let store = Arc::new(MemoryStore::default());
    let blog_service = BlogService::new(store.clone());
    let stats_service = StatsService::new(store.clone(), store.clone());

    let alice = User::new(
        "Alice".to_string(),
        "Ames".to_string(),
        "alice@example.com".to_string(),
        "hash".to_string(),
    );
    let bob = User::new(
        "Bob".to_string(),
        "Burke".to_string(),
        "bob@example.com".to_string(),
        "hash".to_string(),
    );
    let alice_id = alice.id;
    let bob_id = bob.id;
    UserRepository::insert(store.as_ref(), alice).await.unwrap();
    UserRepository::insert(store.as_ref(), bob).await.unwrap();

    seed_published(&store, alice_id, "A1", &["rust", "web"]).await;
    seed_published(&store, alice_id, "A2", &["rust"]).await;
    seed_published(&store, bob_id, "B1", &["web"]).await;
    blog_service
        .create(bob_id, new_blog("B2", words(5)))
        .await
        .unwrap();

    let Stats {
        users,
        blogs,
        published,
        drafts,
        top_tags,
        top_authors,
    } = stats_service.stats().await.unwrap();

    assert_eq!(users, 2);
    assert_eq!(blogs, 4);
    assert_eq!(published, 3);
    assert_eq!(drafts, 1);

    // rust and web both appear twice; the tie breaks on tag name.
    assert_eq!(top_tags[0].tag, "rust");
    assert_eq!(top_tags[0].count, 2);
    assert_eq!(top_tags[1].tag, "web");

    // Two posts each; alice@ sorts before bob@.
    assert_eq!(top_authors[0].email, "alice@example.com");
    assert_eq!(top_authors[0].name, "Alice Ames");
    assert_eq!(top_authors[1].email, "bob@example.com");
}
