//! Article persistence
//!
//! The resolver only needs [`ArticleStore::query`]; the remaining operations
//! back the GraphQL mutations and seeding.

pub mod database;
pub mod entity;
pub mod memory;

pub use database::{init_database, SeaOrmArticleStore};
pub use memory::InMemoryArticleStore;

use std::cmp::Ordering;

use async_trait::async_trait;

use crate::article::{Article, ArticleDraft};
use crate::pagination::ArticleCursor;

/// Keyset page query.
///
/// Rows with a deletion marker are always excluded and rows always come back
/// ordered by `(createdAt DESC, id DESC)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    /// Only rows strictly after this position in descending order
    pub after: Option<ArticleCursor>,
    pub limit: u64,
}

impl ArticleQuery {
    pub fn first(limit: u64) -> Self {
        Self { after: None, limit }
    }

    pub fn after(mut self, cursor: ArticleCursor) -> Self {
        self.after = Some(cursor);
        self
    }
}

/// Stream order: newest first, ties broken by descending id
pub fn stream_order(a: &ArticleCursor, b: &ArticleCursor) -> Ordering {
    (&b.created_at, &b.id).cmp(&(&a.created_at, &a.id))
}

/// Query-capable article store
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Non-deleted rows in stream order, after `query.after`, at most `query.limit`
    async fn query(&self, query: &ArticleQuery) -> crate::Result<Vec<Article>>;

    /// Non-deleted article by id
    async fn find(&self, id: &str) -> crate::Result<Option<Article>>;

    /// Insert a new article, assigning its id and creation time
    async fn create(&self, draft: ArticleDraft) -> crate::Result<Article>;

    /// Replace the editable fields of a non-deleted article
    async fn update(&self, id: &str, draft: ArticleDraft) -> crate::Result<Article>;

    /// Set the deletion marker. Returns `false` when there was nothing to delete.
    async fn soft_delete(&self, id: &str) -> crate::Result<bool>;

    /// Number of non-deleted articles
    async fn count(&self) -> crate::Result<u64>;
}
