//! Partial index backing the `(createdAt DESC, id DESC)` keyset scan over live rows

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"CREATE INDEX IF NOT EXISTS "idx_sports_articles_cursor_active"
                   ON "sports_articles" ("createdAt" DESC, "id" DESC)
                   WHERE "deletedAt" IS NULL"#,
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"DROP INDEX IF EXISTS "idx_sports_articles_cursor_active""#)
            .await?;
        Ok(())
    }
}
