//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::extension::postgres::{PgBinOper, PgFunc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbBackend, DbConn, DbErr, EntityTrait,
    FromQueryResult, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    Statement,
};
use uuid::Uuid;

use quill_core::domain::{AuthorPostCount, Blog, BlogState, BlogWithAuthor, TagCount, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BlogFilter, BlogRepository, Page, PageRequest, SortField, SortOrder, SortSpec, UserRepository,
};

use super::entity::{blog, user};

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

/// PostgreSQL blog repository.
pub struct PostgresBlogRepository {
    db: DbConn,
}

impl PostgresBlogRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        let active: user::ActiveModel = entity.into();
        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| constraint_or_query(e, "Email already registered"))?;
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        user::Entity::find().count(&self.db).await.map_err(query_err)
    }

    async fn delete_all(&self) -> Result<u64, RepoError> {
        let result = user::Entity::delete_many()
            .exec(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.rows_affected)
    }
}

#[async_trait]
impl BlogRepository for PostgresBlogRepository {
    async fn insert(&self, entity: Blog) -> Result<Blog, RepoError> {
        let title = entity.title.clone();
        let active: blog::ActiveModel = entity.into();
        let model = active.insert(&self.db).await.map_err(|e| {
            constraint_or_query(e, &format!("A blog titled '{title}' already exists"))
        })?;
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>, RepoError> {
        let result = blog::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn update(&self, entity: Blog) -> Result<Blog, RepoError> {
        let title = entity.title.clone();
        let active: blog::ActiveModel = entity.into();
        let model = active.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => RepoError::NotFound,
            e => constraint_or_query(e, &format!("A blog titled '{title}' already exists")),
        })?;
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = blog::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn title_exists(&self, title: &str) -> Result<bool, RepoError> {
        let count = blog::Entity::find()
            .filter(blog::Column::Title.eq(title))
            .count(&self.db)
            .await
            .map_err(query_err)?;
        Ok(count > 0)
    }

    async fn list_with_authors(
        &self,
        filter: &BlogFilter,
        sort: SortSpec,
        page: PageRequest,
    ) -> Result<Page<BlogWithAuthor>, RepoError> {
        let query = apply_filter(blog::Entity::find(), filter);
        let total = query.clone().count(&self.db).await.map_err(query_err)?;

        let rows = apply_sort(query, sort)
            .find_also_related(user::Entity)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        let items = rows
            .into_iter()
            .map(|(model, author)| BlogWithAuthor {
                blog: model.into(),
                author: author.map(Into::into),
            })
            .collect();

        Ok(Page { items, total })
    }

    async fn list_by_author(
        &self,
        author: Uuid,
        state: Option<BlogState>,
        page: PageRequest,
    ) -> Result<Page<Blog>, RepoError> {
        let mut query = blog::Entity::find().filter(blog::Column::AuthorId.eq(author));
        if let Some(state) = state {
            query = query.filter(blog::Column::State.eq(state.as_str()));
        }

        let total = query.clone().count(&self.db).await.map_err(query_err)?;
        let models = query
            .order_by_desc(blog::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(Page {
            items: models.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn find_published_and_bump_reads(
        &self,
        id: Uuid,
    ) -> Result<Option<BlogWithAuthor>, RepoError> {
        // Single UPDATE .. RETURNING so concurrent readers never lose
        // increments.
        let updated = blog::Entity::update_many()
            .col_expr(
                blog::Column::ReadCount,
                Expr::col(blog::Column::ReadCount).add(1),
            )
            .filter(blog::Column::Id.eq(id))
            .filter(blog::Column::State.eq(BlogState::Published.as_str()))
            .exec_with_returning(&self.db)
            .await
            .map_err(query_err)?;

        let Some(model) = updated.into_iter().next() else {
            return Ok(None);
        };

        let author = user::Entity::find_by_id(model.author_id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(Some(BlogWithAuthor {
            blog: model.into(),
            author: author.map(Into::into),
        }))
    }

    async fn count_by_state(&self, state: Option<BlogState>) -> Result<u64, RepoError> {
        let mut query = blog::Entity::find();
        if let Some(state) = state {
            query = query.filter(blog::Column::State.eq(state.as_str()));
        }
        query.count(&self.db).await.map_err(query_err)
    }

    async fn top_tags(&self, limit: u64) -> Result<Vec<TagCount>, RepoError> {
        let rows = TagCountRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"SELECT t.tag AS tag, COUNT(*) AS count
               FROM blogs, unnest(blogs.tags) AS t(tag)
               GROUP BY t.tag
               ORDER BY count DESC, tag ASC
               LIMIT $1"#,
            [(limit as i64).into()],
        ))
        .all(&self.db)
        .await
        .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|row| TagCount {
                tag: row.tag,
                count: row.count as u64,
            })
            .collect())
    }

    async fn top_authors(&self, limit: u64) -> Result<Vec<AuthorPostCount>, RepoError> {
        let rows = AuthorCountRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"SELECT u.first_name AS first_name, u.last_name AS last_name,
                      u.email AS email, COUNT(*) AS count
               FROM blogs b
               JOIN users u ON u.id = b.author_id
               GROUP BY u.id, u.first_name, u.last_name, u.email
               ORDER BY count DESC, email ASC
               LIMIT $1"#,
            [(limit as i64).into()],
        ))
        .all(&self.db)
        .await
        .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|row| AuthorPostCount {
                name: format!("{} {}", row.first_name, row.last_name),
                email: row.email,
                count: row.count as u64,
            })
            .collect())
    }

    async fn delete_all(&self) -> Result<u64, RepoError> {
        let result = blog::Entity::delete_many()
            .exec(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.rows_affected)
    }
}

#[derive(Debug, FromQueryResult)]
struct TagCountRow {
    tag: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct AuthorCountRow {
    first_name: String,
    last_name: String,
    email: String,
    count: i64,
}

fn apply_filter(mut query: Select<blog::Entity>, filter: &BlogFilter) -> Select<blog::Entity> {
    if let Some(state) = filter.state {
        query = query.filter(blog::Column::State.eq(state.as_str()));
    }
    if let Some(search) = &filter.search {
        // The free-text search covers the title and exact tag membership.
        let pattern = like_pattern(search);
        query = query.filter(
            Condition::any()
                .add(
                    Expr::col((blog::Entity, blog::Column::Title))
                        .binary(PgBinOper::ILike, pattern),
                )
                .add(tag_membership(search)),
        );
    }
    if let Some(title) = &filter.title {
        query = query.filter(
            Expr::col((blog::Entity, blog::Column::Title))
                .binary(PgBinOper::ILike, like_pattern(title)),
        );
    }
    if let Some(tags) = &filter.tags {
        let mut any_tag = Condition::any();
        for tag in tags {
            any_tag = any_tag.add(tag_membership(tag));
        }
        query = query.filter(any_tag);
    }
    query
}

fn apply_sort(query: Select<blog::Entity>, sort: SortSpec) -> Select<blog::Entity> {
    let column = match sort.field {
        SortField::CreatedAt => blog::Column::CreatedAt,
        SortField::UpdatedAt => blog::Column::UpdatedAt,
        SortField::Title => blog::Column::Title,
        SortField::ReadCount => blog::Column::ReadCount,
        SortField::ReadingTime => blog::Column::ReadingTime,
    };
    let order = match sort.order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    };
    query.order_by(column, order)
}

/// `value = ANY(tags)` - exact membership in the tag array.
fn tag_membership(value: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::val(value.to_string()).eq(PgFunc::any(Expr::col((blog::Entity, blog::Column::Tags))))
}

fn like_pattern(input: &str) -> String {
    let escaped = input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

/// Unique-violation errors become constraint failures with a caller-facing
/// message; everything else stays a query error.
fn constraint_or_query(e: DbErr, message: &str) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint(message.to_string())
    } else {
        RepoError::Query(err_str)
    }
}
