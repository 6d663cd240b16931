#[cfg(test)]
mod tests {
    use crate::database::entity::{blog, user};
    use crate::database::postgres_repo::{PostgresBlogRepository, PostgresUserRepository};
    use quill_core::domain::BlogState;
    use quill_core::error::RepoError;
    use quill_core::ports::{BlogRepository, UserRepository};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn blog_row(id: uuid::Uuid, state: &str, read_count: i64) -> blog::Model {
        let now = chrono::Utc::now();
        blog::Model {
            id,
            title: "Test Blog".to_owned(),
            description: None,
            body: "Some body".to_owned(),
            author_id: uuid::Uuid::new_v4(),
            state: state.to_owned(),
            read_count,
            reading_time: 1,
            tags: vec!["rust".to_owned()],
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_find_blog_by_id() {
        let blog_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![blog_row(blog_id, "draft", 0)]])
            .into_connection();

        let repo = PostgresBlogRepository::new(db);

        let result = repo.find_by_id(blog_id).await.unwrap();

        assert!(result.is_some());
        let blog = result.unwrap();
        assert_eq!(blog.title, "Test Blog");
        assert_eq!(blog.id, blog_id);
        assert_eq!(blog.state, BlogState::Draft);
        assert_eq!(blog.tags, vec!["rust".to_owned()]);
    }

    #[tokio::test]
    async fn test_bump_reads_returns_post_increment_row_with_author() {
        let blog_id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();
        let mut row = blog_row(blog_id, "published", 5);
        let author_id = row.author_id;

        // The UPDATE .. RETURNING result, then the author lookup.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![{
                row.read_count = 6;
                row
            }]])
            .append_query_results(vec![vec![user::Model {
                id: author_id,
                first_name: "Ada".to_owned(),
                last_name: "Lovelace".to_owned(),
                email: "ada@example.com".to_owned(),
                password_hash: "hash".to_owned(),
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresBlogRepository::new(db);

        let result = repo
            .find_published_and_bump_reads(blog_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.blog.read_count, 6);
        let author = result.author.unwrap();
        assert_eq!(author.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_bump_reads_misses_on_drafts_and_unknown_ids() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(Vec::<Vec<blog::Model>>::from([vec![]]))
            .into_connection();

        let repo = PostgresBlogRepository::new(db);

        let result = repo
            .find_published_and_bump_reads(uuid::Uuid::new_v4())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_blog_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresBlogRepository::new(db);

        let result = repo.delete(uuid::Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let now = chrono::Utc::now();
        let user_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user::Model {
                id: user_id,
                first_name: "Grace".to_owned(),
                last_name: "Hopper".to_owned(),
                email: "grace@example.com".to_owned(),
                password_hash: "hash".to_owned(),
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let result = repo.find_by_email("grace@example.com").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().id, user_id);
    }
}
