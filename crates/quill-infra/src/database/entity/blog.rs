//! Blog entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "blogs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub author_id: Uuid,
    pub state: String,
    pub read_count: i64,
    pub reading_time: i32,
    pub tags: Vec<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Blog.
impl From<Model> for quill_core::domain::Blog {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            body: model.body,
            author: model.author_id,
            // A check constraint on the column keeps the stored value inside
            // the enum.
            state: model.state.parse().unwrap_or_default(),
            read_count: model.read_count,
            reading_time: model.reading_time,
            tags: model.tags,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Blog to SeaORM ActiveModel.
impl From<quill_core::domain::Blog> for ActiveModel {
    fn from(blog: quill_core::domain::Blog) -> Self {
        Self {
            id: Set(blog.id),
            title: Set(blog.title),
            description: Set(blog.description),
            body: Set(blog.body),
            author_id: Set(blog.author),
            state: Set(blog.state.to_string()),
            read_count: Set(blog.read_count),
            reading_time: Set(blog.reading_time),
            tags: Set(blog.tags),
            created_at: Set(blog.created_at.into()),
            updated_at: Set(blog.updated_at.into()),
        }
    }
}
