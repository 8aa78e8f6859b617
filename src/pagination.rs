//! Relay-style keyset cursor pagination
//!
//! Cursors are opaque to clients. Internally a cursor is the URL-safe base64
//! of a compact JSON record holding the two ordering keys, `createdAt` and `id`.

use std::borrow::Cow;

use async_graphql::{Object, OutputType, SimpleObject, TypeName};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Page size used when `first` is omitted
pub const DEFAULT_PAGE_SIZE: i32 = 10;

/// Smallest page the resolver will return
pub const MIN_PAGE_SIZE: i32 = 1;

/// Largest page the resolver will return
pub const MAX_PAGE_SIZE: i32 = 50;

/// Clamp a requested page size into `[MIN_PAGE_SIZE, MAX_PAGE_SIZE]`.
///
/// Out-of-range values are clamped, never rejected.
pub fn clamp_page_size(requested: i32) -> u64 {
    requested.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE) as u64
}

/// Position of a row in the `(createdAt DESC, id DESC)` stream
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArticleCursor {
    pub created_at: DateTime<Utc>,
    pub id: String,
}

impl ArticleCursor {
    pub fn new(created_at: DateTime<Utc>, id: impl Into<String>) -> Self {
        Self {
            created_at,
            id: id.into(),
        }
    }
}

/// Wire payload inside the base64 envelope
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CursorPayload {
    created_at: Option<String>,
    id: Option<String>,
}

/// Cursor encoding/decoding
pub struct CursorCodec;

impl CursorCodec {
    /// Encode a position to an opaque, URL-safe token
    pub fn encode(cursor: &ArticleCursor) -> String {
        let payload = CursorPayload {
            created_at: Some(cursor.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            id: Some(cursor.id.clone()),
        };
        // Serializing two strings into JSON cannot fail.
        let json = serde_json::to_vec(&payload).unwrap_or_default();
        BASE64.encode(json)
    }

    /// Decode a token produced by [`CursorCodec::encode`].
    ///
    /// Every failure is reported as [`crate::Error::MalformedCursor`].
    pub fn decode(cursor: &str) -> crate::Result<ArticleCursor> {
        let bytes = BASE64
            .decode(cursor.trim_end_matches('=').as_bytes())
            .map_err(|_| malformed("not base64url"))?;
        let payload: CursorPayload =
            serde_json::from_slice(&bytes).map_err(|_| malformed("unexpected payload"))?;

        let created_at = payload
            .created_at
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed("missing createdAt"))?;
        let id = payload
            .id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed("missing id"))?;

        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|_| malformed("invalid createdAt"))?
            .with_timezone(&Utc);

        Ok(ArticleCursor { created_at, id })
    }
}

fn malformed(reason: &str) -> crate::Error {
    crate::Error::MalformedCursor(reason.to_string())
}

/// Page information
#[derive(SimpleObject, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Edge in a connection
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Edge<T> {
    pub cursor: String,
    pub node: T,
}

impl<T: OutputType> TypeName for Edge<T> {
    fn type_name() -> Cow<'static, str> {
        format!("{}Edge", <T as OutputType>::type_name()).into()
    }
}

#[Object(name_type)]
impl<T: OutputType> Edge<T> {
    async fn cursor(&self) -> &str {
        &self.cursor
    }

    async fn node(&self) -> &T {
        &self.node
    }
}

/// Connection (paginated result)
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

impl<T: OutputType> TypeName for Connection<T> {
    fn type_name() -> Cow<'static, str> {
        format!("{}Connection", <T as OutputType>::type_name()).into()
    }
}

#[Object(name_type)]
impl<T: OutputType> Connection<T> {
    async fn edges(&self) -> &[Edge<T>] {
        &self.edges
    }

    async fn page_info(&self) -> &PageInfo {
        &self.page_info
    }
}

impl<T> Connection<T> {
    /// Build a page from `limit + 1` fetched rows.
    ///
    /// A row beyond `limit` is the lookahead row: it only signals that another
    /// page exists and is dropped from the result.
    pub fn from_lookahead<F>(mut rows: Vec<T>, limit: u64, cursor_of: F) -> Self
    where
        F: Fn(&T) -> String,
    {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let has_next_page = rows.len() > limit;
        rows.truncate(limit);

        let edges: Vec<Edge<T>> = rows
            .into_iter()
            .map(|node| Edge {
                cursor: cursor_of(&node),
                node,
            })
            .collect();
        let end_cursor = edges.last().map(|e| e.cursor.clone());

        Self {
            edges,
            page_info: PageInfo {
                end_cursor,
                has_next_page,
            },
        }
    }

    /// Create empty connection
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo {
                end_cursor: None,
                has_next_page: false,
            },
        }
    }

    /// Nodes in page order
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|e| &e.node)
    }

    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|e| e.node).collect()
    }
}
