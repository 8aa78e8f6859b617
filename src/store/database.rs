//! SeaORM implementation of [`ArticleStore`]

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use super::entity;
use super::{ArticleQuery, ArticleStore};
use crate::article::{truncate_to_millis, Article, ArticleDraft};
use crate::migrator::Migrator;
use crate::Error;

/// Connect to `url` and bring the schema up to date
pub async fn init_database(url: &str) -> Result<DatabaseConnection, DbErr> {
    info!("Connecting to database: {}", url);
    let db = Database::connect(url).await?;
    info!("Running database migrations...");
    Migrator::up(&db, None).await?;
    info!("Database ready");
    Ok(db)
}

pub struct SeaOrmArticleStore {
    db: DatabaseConnection,
}

impl SeaOrmArticleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn find_live(&self, id: &str) -> crate::Result<Option<entity::Model>> {
        Ok(entity::Entity::find_by_id(id)
            .filter(entity::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?)
    }
}

/// `(createdAt, id) < (after.createdAt, after.id)` as a row-value comparison
fn strictly_after(after: &crate::pagination::ArticleCursor) -> SimpleExpr {
    Expr::tuple([
        SimpleExpr::from(Expr::col((entity::Entity, entity::Column::CreatedAt))),
        SimpleExpr::from(Expr::col((entity::Entity, entity::Column::Id))),
    ])
    .lt(Expr::tuple([
        Expr::value(after.created_at),
        Expr::value(after.id.clone()),
    ]))
}

#[async_trait]
impl ArticleStore for SeaOrmArticleStore {
    async fn query(&self, query: &ArticleQuery) -> crate::Result<Vec<Article>> {
        let mut select = entity::Entity::find().filter(entity::Column::DeletedAt.is_null());
        if let Some(after) = &query.after {
            select = select.filter(strictly_after(after));
        }

        let rows = select
            .order_by_desc(entity::Column::CreatedAt)
            .order_by_desc(entity::Column::Id)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        debug!("Keyset query returned {} rows", rows.len());
        Ok(rows.into_iter().map(Article::from).collect())
    }

    async fn find(&self, id: &str) -> crate::Result<Option<Article>> {
        Ok(self.find_live(id).await?.map(Article::from))
    }

    async fn create(&self, draft: ArticleDraft) -> crate::Result<Article> {
        let row = entity::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            title: Set(draft.title),
            content: Set(draft.content),
            created_at: Set(truncate_to_millis(Utc::now())),
            deleted_at: Set(None),
            image_url: Set(draft.image_url),
        };
        let model = row.insert(&self.db).await?;
        debug!("Created article {}", model.id);
        Ok(model.into())
    }

    async fn update(&self, id: &str, draft: ArticleDraft) -> crate::Result<Article> {
        let existing = self
            .find_live(id)
            .await?
            .ok_or_else(|| Error::NotFound("Article not found".to_string()))?;

        let mut row = existing.into_active_model();
        row.title = Set(draft.title);
        row.content = Set(draft.content);
        row.image_url = Set(draft.image_url);
        Ok(row.update(&self.db).await?.into())
    }

    async fn soft_delete(&self, id: &str) -> crate::Result<bool> {
        let result = entity::Entity::update_many()
            .col_expr(
                entity::Column::DeletedAt,
                Expr::value(truncate_to_millis(Utc::now())),
            )
            .filter(entity::Column::Id.eq(id))
            .filter(entity::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        let deleted = result.rows_affected > 0;
        if deleted {
            debug!("Soft-deleted article {}", id);
        }
        Ok(deleted)
    }

    async fn count(&self) -> crate::Result<u64> {
        Ok(entity::Entity::find()
            .filter(entity::Column::DeletedAt.is_null())
            .count(&self.db)
            .await?)
    }
}
