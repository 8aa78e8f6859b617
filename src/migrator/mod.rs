//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20251217_000001_create_sports_articles;
mod m20251218_000002_add_cursor_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251217_000001_create_sports_articles::Migration),
            Box::new(m20251218_000002_add_cursor_index::Migration),
        ]
    }
}
