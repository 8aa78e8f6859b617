//! Keyset page resolver behind `articlesConnection`

use std::sync::Arc;

use tracing::{debug, warn};

use crate::article::Article;
use crate::pagination::{clamp_page_size, Connection, CursorCodec};
use crate::store::{ArticleQuery, ArticleStore};
use crate::Error;

/// Resolves forward pages of live articles, newest first.
///
/// Each call issues a single store query for `limit + 1` rows; the extra row
/// only decides `hasNextPage`.
#[derive(Clone)]
pub struct KeysetPageResolver {
    store: Arc<dyn ArticleStore>,
}

impl KeysetPageResolver {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ArticleStore> {
        &self.store
    }

    /// Fetch the page of at most `first` articles after `after`.
    ///
    /// `first` is clamped to `[1, 50]`. An undecodable `after` fails with
    /// [`Error::BadCursor`]; store failures are returned as-is.
    pub async fn fetch_page(&self, first: i32, after: Option<&str>) -> crate::Result<Connection<Article>> {
        let limit = clamp_page_size(first);

        let after = after
            .map(CursorCodec::decode)
            .transpose()
            .map_err(|e| {
                warn!("Rejected pagination cursor: {}", e);
                Error::BadCursor(e.to_string())
            })?;

        let mut query = ArticleQuery::first(limit + 1);
        if let Some(cursor) = after {
            query = query.after(cursor);
        }

        let rows = self.store.query(&query).await?;
        debug!(
            requested = first,
            limit,
            fetched = rows.len(),
            "Resolved articles page"
        );

        Ok(Connection::from_lookahead(rows, limit, |article| {
            CursorCodec::encode(&article.cursor())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::ArticleDraft;
    use crate::pagination::ArticleCursor;
    use crate::store::InMemoryArticleStore;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn article(millis: i64, id: &str) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Test Article {id}"),
            content: format!("Content for test article {id}"),
            created_at: Utc.timestamp_millis_opt(millis).unwrap(),
            deleted_at: None,
            image_url: None,
        }
    }

    fn seeded(count: i64) -> (Arc<InMemoryArticleStore>, KeysetPageResolver) {
        let store = Arc::new(InMemoryArticleStore::new());
        for i in 0..count {
            store.insert(article(1_000 + i * 10, &format!("article-{i:02}")));
        }
        let resolver = KeysetPageResolver::new(store.clone());
        (store, resolver)
    }

    fn ids(page: &Connection<Article>) -> Vec<String> {
        page.nodes().map(|a| a.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_first_page() {
        let (_, resolver) = seeded(10);
        let page = resolver.fetch_page(5, None).await.unwrap();

        assert_eq!(page.edges.len(), 5);
        assert!(page.page_info.has_next_page);
        assert_eq!(
            page.page_info.end_cursor.as_deref(),
            page.edges.last().map(|e| e.cursor.as_str())
        );
        assert_eq!(ids(&page)[0], "article-09");
    }

    #[tokio::test]
    async fn test_second_page_has_no_duplicates_or_gaps() {
        let (_, resolver) = seeded(10);
        let first = resolver.fetch_page(5, None).await.unwrap();
        let second = resolver
            .fetch_page(5, first.page_info.end_cursor.as_deref())
            .await
            .unwrap();

        let all: HashSet<String> = ids(&first).into_iter().chain(ids(&second)).collect();
        assert_eq!(all.len(), 10);

        let first_min = first.nodes().map(|a| a.created_at).min().unwrap();
        let second_max = second.nodes().map(|a| a.created_at).max().unwrap();
        assert!(first_min >= second_max);
        assert_ne!(first.page_info.end_cursor, second.page_info.end_cursor);
    }

    #[tokio::test]
    async fn test_exact_last_page() {
        let (_, resolver) = seeded(8);
        let first = resolver.fetch_page(5, None).await.unwrap();
        assert!(first.page_info.has_next_page);

        let second = resolver
            .fetch_page(5, first.page_info.end_cursor.as_deref())
            .await
            .unwrap();
        assert_eq!(second.edges.len(), 3);
        assert!(!second.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_page_exactly_filling_store_has_no_next_page() {
        let (_, resolver) = seeded(5);
        let page = resolver.fetch_page(5, None).await.unwrap();
        assert_eq!(page.edges.len(), 5);
        assert!(!page.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_page_size_is_clamped() {
        let (_, resolver) = seeded(60);

        let tiny = resolver.fetch_page(0, None).await.unwrap();
        let one = resolver.fetch_page(1, None).await.unwrap();
        assert_eq!(tiny.edges.len(), 1);
        assert_eq!(ids(&tiny), ids(&one));

        let huge = resolver.fetch_page(1000, None).await.unwrap();
        let fifty = resolver.fetch_page(50, None).await.unwrap();
        assert_eq!(huge.edges.len(), 50);
        assert_eq!(ids(&huge), ids(&fifty));
        assert!(huge.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_soft_deleted_articles_are_excluded() {
        let (store, resolver) = seeded(10);
        assert!(store.soft_delete("article-00").await.unwrap());

        let page = resolver.fetch_page(10, None).await.unwrap();
        assert_eq!(page.edges.len(), 9);
        assert!(!ids(&page).contains(&"article-00".to_string()));
        assert!(!page.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_equal_timestamps_page_without_skips_or_repeats() {
        let store = Arc::new(InMemoryArticleStore::new());
        for i in 0..7 {
            store.insert(article(5_000, &format!("same-{i}")));
        }
        let resolver = KeysetPageResolver::new(store);

        let mut seen = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let page = resolver.fetch_page(2, after.as_deref()).await.unwrap();
            seen.extend(ids(&page));
            if !page.page_info.has_next_page {
                break;
            }
            after = page.page_info.end_cursor;
        }

        let expected: Vec<String> = (0..7).rev().map(|i| format!("same-{i}")).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let resolver = KeysetPageResolver::new(Arc::new(InMemoryArticleStore::new()));
        let page = resolver.fetch_page(10, None).await.unwrap();
        assert!(page.edges.is_empty());
        assert_eq!(page.page_info.end_cursor, None);
        assert!(!page.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_bad_cursor_fails_whole_operation() {
        let (_, resolver) = seeded(3);
        let err = resolver.fetch_page(5, Some("definitely-not-a-cursor")).await.unwrap_err();
        assert!(matches!(err, Error::BadCursor(_)));
        assert!(err.is_user_input());
    }

    #[tokio::test]
    async fn test_cursor_to_unknown_position_still_pages() {
        let (_, resolver) = seeded(4);
        let cursor = CursorCodec::encode(&ArticleCursor::new(
            Utc.timestamp_millis_opt(1_015).unwrap(),
            "zzz",
        ));
        let page = resolver.fetch_page(10, Some(&cursor)).await.unwrap();
        assert_eq!(ids(&page), vec!["article-01", "article-00"]);
    }

    struct FailingStore {
        calls: AtomicU64,
    }

    #[async_trait]
    impl ArticleStore for FailingStore {
        async fn query(&self, _query: &ArticleQuery) -> crate::Result<Vec<Article>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::StoreUnavailable("connection refused".into()))
        }
        async fn find(&self, _id: &str) -> crate::Result<Option<Article>> {
            unimplemented!()
        }
        async fn create(&self, _draft: ArticleDraft) -> crate::Result<Article> {
            unimplemented!()
        }
        async fn update(&self, _id: &str, _draft: ArticleDraft) -> crate::Result<Article> {
            unimplemented!()
        }
        async fn soft_delete(&self, _id: &str) -> crate::Result<bool> {
            unimplemented!()
        }
        async fn count(&self) -> crate::Result<u64> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced_without_retry() {
        let store = Arc::new(FailingStore {
            calls: AtomicU64::new(0),
        });
        let resolver = KeysetPageResolver::new(store.clone());

        let err = resolver.fetch_page(5, None).await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }
}
