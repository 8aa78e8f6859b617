//! In-memory article store for development and testing

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use super::{stream_order, ArticleQuery, ArticleStore};
use crate::article::{truncate_to_millis, Article, ArticleDraft};
use crate::Error;

/// In-memory storage, keyed by article id
pub struct InMemoryArticleStore {
    articles: DashMap<String, Article>,
}

impl InMemoryArticleStore {
    pub fn new() -> Self {
        Self {
            articles: DashMap::new(),
        }
    }

    /// Insert a fully-formed article as-is (fixed ids and timestamps)
    pub fn insert(&self, article: Article) {
        self.articles.insert(article.id.clone(), article);
    }

    /// Stored row by id, including soft-deleted rows
    pub fn get_raw(&self, id: &str) -> Option<Article> {
        self.articles.get(id).map(|a| a.clone())
    }

    fn live(&self, id: &str) -> Option<Article> {
        self.get_raw(id).filter(|a| !a.is_deleted())
    }
}

impl Default for InMemoryArticleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn query(&self, query: &ArticleQuery) -> crate::Result<Vec<Article>> {
        let mut rows: Vec<Article> = self
            .articles
            .iter()
            .filter(|entry| !entry.is_deleted())
            .filter(|entry| match &query.after {
                Some(after) => stream_order(&entry.cursor(), after) == Ordering::Greater,
                None => true,
            })
            .map(|entry| entry.value().clone())
            .collect();

        rows.sort_by(|a, b| stream_order(&a.cursor(), &b.cursor()));
        rows.truncate(usize::try_from(query.limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn find(&self, id: &str) -> crate::Result<Option<Article>> {
        Ok(self.live(id))
    }

    async fn create(&self, draft: ArticleDraft) -> crate::Result<Article> {
        let article = Article {
            id: uuid::Uuid::new_v4().to_string(),
            title: draft.title,
            content: draft.content,
            created_at: truncate_to_millis(Utc::now()),
            deleted_at: None,
            image_url: draft.image_url,
        };
        self.insert(article.clone());
        debug!("Created article {}", article.id);
        Ok(article)
    }

    async fn update(&self, id: &str, draft: ArticleDraft) -> crate::Result<Article> {
        let mut entry = self
            .articles
            .get_mut(id)
            .filter(|a| !a.is_deleted())
            .ok_or_else(|| Error::NotFound("Article not found".to_string()))?;

        entry.title = draft.title;
        entry.content = draft.content;
        entry.image_url = draft.image_url;
        Ok(entry.clone())
    }

    async fn soft_delete(&self, id: &str) -> crate::Result<bool> {
        match self.articles.get_mut(id) {
            Some(mut entry) if !entry.is_deleted() => {
                entry.deleted_at = Some(truncate_to_millis(Utc::now()));
                debug!("Soft-deleted article {}", id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count(&self) -> crate::Result<u64> {
        Ok(self.articles.iter().filter(|a| !a.is_deleted()).count() as u64)
    }
}
