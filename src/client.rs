//! Client side of the `articlesConnection` wire contract

use async_graphql::{Request, Value, Variables};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::accumulator::PageFetcher;
use crate::pagination::Connection;
use crate::schema::ArticlesSchema;
use crate::Error;

/// The list query the web client issues
pub const ARTICLES_CONNECTION: &str = r#"
query ArticlesConnection($first: Int, $after: String) {
  articlesConnection(first: $first, after: $after) {
    edges {
      cursor
      node {
        id
        title
        createdAt
        imageUrl
      }
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}
"#;

/// Article fields selected by [`ARTICLES_CONNECTION`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleNode {
    pub id: String,
    pub title: String,
    pub created_at: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticlesConnectionData {
    articles_connection: Connection<ArticleNode>,
}

/// Fetches pages by executing [`ARTICLES_CONNECTION`] and decoding the JSON
/// response, exactly as a remote client would see it.
#[derive(Clone)]
pub struct GraphQlPageFetcher {
    schema: ArticlesSchema,
}

impl GraphQlPageFetcher {
    pub fn new(schema: ArticlesSchema) -> Self {
        Self { schema }
    }
}

#[async_trait]
impl PageFetcher for GraphQlPageFetcher {
    type Node = ArticleNode;

    async fn fetch_page(
        &self,
        first: i32,
        after: Option<String>,
    ) -> crate::Result<Connection<ArticleNode>> {
        let variables = Variables::from_json(json!({ "first": first, "after": after }));
        let response = self
            .schema
            .execute(Request::new(ARTICLES_CONNECTION).variables(variables))
            .await;

        if let Some(error) = response.errors.first() {
            let user_input = error
                .extensions
                .as_ref()
                .and_then(|ext| ext.get("code"))
                .is_some_and(|code| matches!(code, Value::String(c) if c == "BAD_USER_INPUT"));
            return Err(if user_input {
                Error::BadCursor(error.message.clone())
            } else {
                Error::StoreUnavailable(error.message.clone())
            });
        }

        let data = response
            .data
            .into_json()
            .map_err(|e| Error::StoreUnavailable(e.to_string()))?;
        let data: ArticlesConnectionData =
            serde_json::from_value(data).map_err(|e| Error::StoreUnavailable(e.to_string()))?;
        Ok(data.articles_connection)
    }
}
