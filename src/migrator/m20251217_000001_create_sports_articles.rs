//! Migration to create sports_articles table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SportsArticles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SportsArticles::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SportsArticles::Title).text().not_null())
                    .col(ColumnDef::new(SportsArticles::Content).text().not_null())
                    .col(
                        ColumnDef::new(SportsArticles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SportsArticles::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(SportsArticles::ImageUrl).text().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SportsArticles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SportsArticles {
    Table,
    Id,
    Title,
    Content,
    #[iden = "createdAt"]
    CreatedAt,
    #[iden = "deletedAt"]
    DeletedAt,
    #[iden = "imageUrl"]
    ImageUrl,
}
