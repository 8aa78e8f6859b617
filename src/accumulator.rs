//! Client-side incremental page loading
//!
//! A [`PageAccumulator`] grows a list of nodes across successive
//! `articlesConnection` fetches. Load triggers (scroll-to-end, "load more")
//! may fire rapidly; at most one fetch is in flight per accumulator and a
//! cursor is never fetched twice in a row. Every fetch is tagged with the
//! generation it was issued in, and results from a generation superseded by
//! [`PageAccumulator::reset`] are dropped.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::article::Article;
use crate::pagination::{Connection, PageInfo, DEFAULT_PAGE_SIZE};
use crate::resolver::KeysetPageResolver;

/// Source of connection pages
#[async_trait]
pub trait PageFetcher: Send + Sync {
    type Node: Clone + Send + Sync;

    async fn fetch_page(
        &self,
        first: i32,
        after: Option<String>,
    ) -> crate::Result<Connection<Self::Node>>;
}

#[async_trait]
impl PageFetcher for KeysetPageResolver {
    type Node = Article;

    async fn fetch_page(&self, first: i32, after: Option<String>) -> crate::Result<Connection<Article>> {
        KeysetPageResolver::fetch_page(self, first, after.as_deref()).await
    }
}

/// Why a load trigger did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Last page already loaded (or nothing loaded yet)
    Exhausted,
    /// Another fetch is outstanding
    InFlight,
    /// The pending cursor was already used for a fetch
    DuplicateCursor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Page applied; carries the number of nodes appended
    Appended(usize),
    Skipped(SkipReason),
    /// Result arrived after a reset and was dropped
    Discarded,
}

#[derive(Debug)]
struct State<T> {
    items: Vec<T>,
    page_info: PageInfo,
    last_cursor: Option<String>,
    in_flight: bool,
    generation: u64,
}

impl<T> State<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            page_info: PageInfo {
                end_cursor: None,
                has_next_page: false,
            },
            last_cursor: None,
            in_flight: false,
            generation: 0,
        }
    }
}

pub struct PageAccumulator<F: PageFetcher> {
    fetcher: F,
    page_size: i32,
    state: Mutex<State<F::Node>>,
}

impl<F: PageFetcher> PageAccumulator<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_page_size(fetcher, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(fetcher: F, page_size: i32) -> Self {
        Self {
            fetcher,
            page_size,
            state: Mutex::new(State::new()),
        }
    }

    /// Accumulated nodes, in arrival order
    pub async fn items(&self) -> Vec<F::Node> {
        self.state.lock().await.items.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Continuation state of the last applied page
    pub async fn page_info(&self) -> PageInfo {
        self.state.lock().await.page_info.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.in_flight
    }

    /// Load the next page if one exists and no fetch for it is pending.
    ///
    /// On failure the continuation state is left as it was, so the same
    /// trigger can be retried, and the error is returned.
    pub async fn on_load_trigger(&self) -> crate::Result<LoadOutcome> {
        let (generation, cursor, previous_cursor) = {
            let mut state = self.state.lock().await;
            let cursor = match (&state.page_info.end_cursor, state.page_info.has_next_page) {
                (Some(cursor), true) => cursor.clone(),
                _ => return Ok(LoadOutcome::Skipped(SkipReason::Exhausted)),
            };
            if state.in_flight {
                return Ok(LoadOutcome::Skipped(SkipReason::InFlight));
            }
            if state.last_cursor.as_deref() == Some(cursor.as_str()) {
                return Ok(LoadOutcome::Skipped(SkipReason::DuplicateCursor));
            }

            state.in_flight = true;
            let previous = state.last_cursor.replace(cursor.clone());
            (state.generation, cursor, previous)
        };

        debug!(generation, "Fetching next page");
        let result = self.fetcher.fetch_page(self.page_size, Some(cursor)).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(generation, current = state.generation, "Discarding stale page");
            return Ok(LoadOutcome::Discarded);
        }
        state.in_flight = false;

        match result {
            Ok(page) => {
                let appended = page.edges.len();
                state.page_info = page.page_info;
                state.items.extend(page.edges.into_iter().map(|e| e.node));
                Ok(LoadOutcome::Appended(appended))
            }
            Err(e) => {
                warn!("Failed to load next page: {}", e);
                state.last_cursor = previous_cursor;
                Err(e)
            }
        }
    }

    /// Drop everything and load the first page as a fresh session.
    ///
    /// Any fetch still outstanding from before the reset is discarded when it
    /// completes.
    pub async fn reset(&self) -> crate::Result<LoadOutcome> {
        let generation = {
            let mut state = self.state.lock().await;
            let generation = state.generation + 1;
            *state = State::new();
            state.generation = generation;
            state.in_flight = true;
            generation
        };

        debug!(generation, "Loading first page");
        let result = self.fetcher.fetch_page(self.page_size, None).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            return Ok(LoadOutcome::Discarded);
        }
        state.in_flight = false;

        let page = result.map_err(|e| {
            warn!("Failed to load first page: {}", e);
            e
        })?;
        let appended = page.edges.len();
        state.page_info = page.page_info;
        state.items = page.edges.into_iter().map(|e| e.node).collect();
        Ok(LoadOutcome::Appended(appended))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Edge;
    use crate::Error;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Pages through `0..total`, optionally parking each fetch until released
    struct NumberFetcher {
        total: u32,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
        failures: std::sync::Mutex<VecDeque<Error>>,
    }

    impl NumberFetcher {
        fn new(total: u32) -> Self {
            Self {
                total,
                calls: AtomicUsize::new(0),
                gate: None,
                failures: std::sync::Mutex::new(VecDeque::new()),
            }
        }

        fn gated(total: u32, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(total)
            }
        }

        fn fail_next(&self, error: Error) {
            self.failures.lock().unwrap().push_back(error);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for NumberFetcher {
        type Node = u32;

        async fn fetch_page(&self, first: i32, after: Option<String>) -> crate::Result<Connection<u32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if let Some(error) = self.failures.lock().unwrap().pop_front() {
                return Err(error);
            }

            let start = after.map(|c| c.parse::<u32>().unwrap() + 1).unwrap_or(0);
            let rows: Vec<u32> = (start..self.total).take(first as usize + 1).collect();
            Ok(Connection::from_lookahead(rows, first as u64, |n| n.to_string()))
        }
    }

    #[tokio::test]
    async fn test_reset_loads_first_page() {
        let acc = PageAccumulator::with_page_size(NumberFetcher::new(25), 10);
        assert_eq!(acc.reset().await.unwrap(), LoadOutcome::Appended(10));
        assert_eq!(acc.items().await, (0..10).collect::<Vec<_>>());
        assert!(acc.page_info().await.has_next_page);
    }

    #[tokio::test]
    async fn test_load_trigger_appends_until_exhausted() {
        let acc = PageAccumulator::with_page_size(NumberFetcher::new(25), 10);
        acc.reset().await.unwrap();

        assert_eq!(acc.on_load_trigger().await.unwrap(), LoadOutcome::Appended(10));
        assert_eq!(acc.on_load_trigger().await.unwrap(), LoadOutcome::Appended(5));
        assert_eq!(
            acc.on_load_trigger().await.unwrap(),
            LoadOutcome::Skipped(SkipReason::Exhausted)
        );
        assert_eq!(acc.items().await, (0..25).collect::<Vec<_>>());
        assert_eq!(acc.fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn test_trigger_before_first_page_is_noop() {
        let acc = PageAccumulator::new(NumberFetcher::new(5));
        assert_eq!(
            acc.on_load_trigger().await.unwrap(),
            LoadOutcome::Skipped(SkipReason::Exhausted)
        );
        assert_eq!(acc.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_rapid_triggers_issue_one_fetch() {
        let acc = PageAccumulator::with_page_size(NumberFetcher::new(30), 10);
        acc.reset().await.unwrap();

        let gate = Arc::new(Notify::new());
        let acc = PageAccumulator {
            fetcher: NumberFetcher::gated(30, gate.clone()),
            page_size: 10,
            state: Mutex::new(acc.state.into_inner()),
        };

        let (first, second, ()) = tokio::join!(acc.on_load_trigger(), acc.on_load_trigger(), async {
            gate.notify_one();
        });

        assert_eq!(first.unwrap(), LoadOutcome::Appended(10));
        assert_eq!(second.unwrap(), LoadOutcome::Skipped(SkipReason::InFlight));
        assert_eq!(acc.fetcher.calls(), 1);
        assert_eq!(acc.len().await, 20);
    }

    #[tokio::test]
    async fn test_repeated_cursor_is_not_refetched() {
        struct StuckFetcher;

        #[async_trait]
        impl PageFetcher for StuckFetcher {
            type Node = u32;

            async fn fetch_page(&self, _first: i32, _after: Option<String>) -> crate::Result<Connection<u32>> {
                Ok(Connection {
                    edges: vec![Edge {
                        cursor: "same".to_string(),
                        node: 1,
                    }],
                    page_info: PageInfo {
                        end_cursor: Some("same".to_string()),
                        has_next_page: true,
                    },
                })
            }
        }

        let acc = PageAccumulator::new(StuckFetcher);
        acc.reset().await.unwrap();
        assert_eq!(acc.on_load_trigger().await.unwrap(), LoadOutcome::Appended(1));
        assert_eq!(
            acc.on_load_trigger().await.unwrap(),
            LoadOutcome::Skipped(SkipReason::DuplicateCursor)
        );
        assert_eq!(acc.len().await, 2);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_state_and_allows_retry() {
        let acc = PageAccumulator::with_page_size(NumberFetcher::new(30), 10);
        acc.reset().await.unwrap();
        let before = acc.page_info().await;

        acc.fetcher
            .fail_next(Error::StoreUnavailable("timeout".into()));
        let err = acc.on_load_trigger().await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
        assert_eq!(acc.page_info().await, before);
        assert_eq!(acc.len().await, 10);
        assert!(!acc.is_loading().await);

        assert_eq!(acc.on_load_trigger().await.unwrap(), LoadOutcome::Appended(10));
        assert_eq!(acc.items().await, (0..20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_stale_load_after_reset_is_discarded() {
        let gate = Arc::new(Notify::new());
        let acc = PageAccumulator::with_page_size(NumberFetcher::new(30), 10);
        acc.reset().await.unwrap();
        let acc = PageAccumulator {
            fetcher: NumberFetcher::gated(30, gate.clone()),
            page_size: 10,
            state: Mutex::new(acc.state.into_inner()),
        };

        // The load parks on the gate; the reset bumps the generation and
        // then parks too. Two permits release both, in order.
        let (load, reset, ()) = tokio::join!(acc.on_load_trigger(), acc.reset(), async {
            gate.notify_one();
            tokio::task::yield_now().await;
            gate.notify_one();
        });

        assert_eq!(load.unwrap(), LoadOutcome::Discarded);
        assert_eq!(reset.unwrap(), LoadOutcome::Appended(10));
        assert_eq!(acc.items().await, (0..10).collect::<Vec<_>>());
        assert!(!acc.is_loading().await);
    }

    #[tokio::test]
    async fn test_reset_after_delete_starts_over() {
        let acc = PageAccumulator::with_page_size(NumberFetcher::new(30), 10);
        acc.reset().await.unwrap();
        acc.on_load_trigger().await.unwrap();
        assert_eq!(acc.len().await, 20);

        acc.reset().await.unwrap();
        assert_eq!(acc.items().await, (0..10).collect::<Vec<_>>());
        // The first page's cursor may be used again in the new session.
        assert_eq!(acc.on_load_trigger().await.unwrap(), LoadOutcome::Appended(10));
    }

    #[tokio::test]
    async fn test_resolver_as_fetcher() {
        use crate::article::ArticleDraft;
        use crate::store::{ArticleStore, InMemoryArticleStore};

        let store = Arc::new(InMemoryArticleStore::new());
        for i in 0..12 {
            store
                .create(ArticleDraft::new(format!("Article {i}"), "body", None))
                .await
                .unwrap();
        }

        let acc = PageAccumulator::with_page_size(KeysetPageResolver::new(store), 5);
        acc.reset().await.unwrap();
        assert_eq!(acc.on_load_trigger().await.unwrap(), LoadOutcome::Appended(5));
        assert_eq!(acc.on_load_trigger().await.unwrap(), LoadOutcome::Appended(2));
        assert!(!acc.page_info().await.has_next_page);

        let items = acc.items().await;
        assert!(items
            .windows(2)
            .all(|w| (&w[0].created_at, &w[0].id) > (&w[1].created_at, &w[1].id)));
    }
}
