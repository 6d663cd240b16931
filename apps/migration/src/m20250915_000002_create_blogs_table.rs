use sea_orm_migration::prelude::*;

use crate::m20250915_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Blogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Blogs::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Blogs::Title)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Blogs::Description).text())
                    .col(ColumnDef::new(Blogs::Body).text().not_null())
                    .col(ColumnDef::new(Blogs::AuthorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Blogs::State)
                            .string()
                            .not_null()
                            .default("draft")
                            .check(Expr::col(Blogs::State).is_in(["draft", "published"])),
                    )
                    .col(
                        ColumnDef::new(Blogs::ReadCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Blogs::ReadingTime)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Blogs::Tags).array(ColumnType::Text).not_null())
                    .col(
                        ColumnDef::new(Blogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Blogs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-blogs-author_id")
                            .from(Blogs::Table, Blogs::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-blogs-state")
                    .table(Blogs::Table)
                    .col(Blogs::State)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-blogs-author_id")
                    .table(Blogs::Table)
                    .col(Blogs::AuthorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Blogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Blogs {
    Table,
    Id,
    Title,
    Description,
    Body,
    AuthorId,
    State,
    ReadCount,
    ReadingTime,
    Tags,
    CreatedAt,
    UpdatedAt,
}
