//! `sports_articles` entity for database

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::article::Article;

/// Sports article row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sports_articles")]
pub struct Model {
    /// UUID v4, as text
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Set once at insert, millisecond precision
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// Soft-deletion marker
    #[sea_orm(column_name = "deletedAt")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[sea_orm(column_name = "imageUrl", column_type = "Text", nullable)]
    pub image_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Article {
    fn from(model: Model) -> Self {
        Article {
            id: model.id,
            title: model.title,
            content: model.content,
            created_at: model.created_at,
            deleted_at: model.deleted_at,
            image_url: model.image_url,
        }
    }
}
