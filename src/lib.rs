//! # sports-articles-graphql
//!
//! GraphQL backend for sports articles with keyset cursor pagination.
//!
//! ## Features
//!
//! - **Cursor Pagination** - opaque `(createdAt, id)` cursors, Relay-style connections
//! - **Keyset Resolver** - lookahead-row paging over any [`ArticleStore`]
//! - **Stores** - SeaORM (SQLite) with migrations, and an in-memory store
//! - **Page Accumulator** - client-side incremental loading with stale-fetch guards
//! - **HTTP** - Axum router serving `/graphql` and `/health`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sports_articles::{InMemoryArticleStore, KeysetPageResolver};
//!
//! # async fn example() -> sports_articles::Result<()> {
//! let resolver = KeysetPageResolver::new(Arc::new(InMemoryArticleStore::new()));
//! let page = resolver.fetch_page(10, None).await?;
//! let next = resolver.fetch_page(10, page.page_info.end_cursor.as_deref()).await?;
//! # let _ = next;
//! # Ok(())
//! # }
//! ```

pub mod accumulator;
pub mod article;
pub mod client;
pub mod config;
pub mod migrator;
pub mod pagination;
pub mod resolver;
pub mod schema;
pub mod seed;
pub mod server;
pub mod store;
pub mod telemetry;

pub use accumulator::{LoadOutcome, PageAccumulator, PageFetcher, SkipReason};
pub use article::{Article, ArticleDraft, ArticleInput};
pub use client::{ArticleNode, GraphQlPageFetcher};
pub use config::AppConfig;
pub use pagination::{ArticleCursor, Connection, CursorCodec, Edge, PageInfo};
pub use resolver::KeysetPageResolver;
pub use schema::{build_schema, ArticlesSchema};
pub use server::create_router;
pub use store::{ArticleQuery, ArticleStore, InMemoryArticleStore, SeaOrmArticleStore};

use async_graphql::ErrorExtensions;
use thiserror::Error;

/// Article service errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Cursor string is not valid codec output
    #[error("Malformed cursor: {0}")]
    MalformedCursor(String),

    /// Caller supplied an undecodable `after` cursor
    #[error("Invalid cursor: {0}")]
    BadCursor(String),

    #[error("{message}")]
    Validation {
        message: String,
        /// `(field, message)` pairs, field names as they appear on the wire
        details: Vec<(String, String)>,
    },

    #[error("{0}")]
    NotFound(String),

    /// Backing store call failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl Error {
    /// GraphQL `extensions.code` for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedCursor(_) | Self::BadCursor(_) | Self::Validation { .. } => {
                "BAD_USER_INPUT"
            }
            Self::NotFound(_) => "NOT_FOUND",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Whether the caller caused this error (as opposed to a fault)
    pub fn is_user_input(&self) -> bool {
        !matches!(self, Self::StoreUnavailable(_))
    }
}

impl ErrorExtensions for Error {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.code());
            if let Self::Validation { details, .. } = self {
                let fields: std::collections::BTreeMap<&str, &str> = details
                    .iter()
                    .map(|(field, message)| (field.as_str(), message.as_str()))
                    .collect();
                if let Ok(value) = async_graphql::to_value(&fields) {
                    e.set("details", value);
                }
            }
        })
    }
}

impl From<sea_orm::DbErr> for Error {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::StoreUnavailable(e.to_string())
    }
}

/// Result type for article operations
pub type Result<T> = std::result::Result<T, Error>;
