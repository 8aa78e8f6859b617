//! GraphQL schema: queries and mutations over sports articles

use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, ErrorExtensions, Object, Schema, ID};
use tracing::info;

use crate::article::{Article, ArticleDraft, ArticleInput};
use crate::pagination::{Connection, DEFAULT_PAGE_SIZE};
use crate::resolver::KeysetPageResolver;
use crate::store::{ArticleQuery, ArticleStore};

/// Articles returned by the unpaginated `articles` query
const LATEST_ARTICLES: u64 = 10;

pub type ArticlesSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the executable schema over `store`
pub fn build_schema(store: Arc<dyn ArticleStore>) -> ArticlesSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(KeysetPageResolver::new(store))
        .finish()
}

fn store<'a>(ctx: &'a Context<'_>) -> async_graphql::Result<&'a Arc<dyn ArticleStore>> {
    Ok(ctx.data::<KeysetPageResolver>()?.store())
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn health(&self) -> &'static str {
        "ok"
    }

    /// Latest articles, newest first
    async fn articles(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Article>> {
        store(ctx)?
            .query(&ArticleQuery::first(LATEST_ARTICLES))
            .await
            .map_err(|e| e.extend())
    }

    async fn article(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<Article>> {
        store(ctx)?.find(&id).await.map_err(|e| e.extend())
    }

    /// Keyset-paginated articles, newest first
    async fn articles_connection(
        &self,
        ctx: &Context<'_>,
        #[graphql(default_with = "Some(DEFAULT_PAGE_SIZE)")] first: Option<i32>,
        after: Option<String>,
    ) -> async_graphql::Result<Connection<Article>> {
        ctx.data::<KeysetPageResolver>()?
            .fetch_page(first.unwrap_or(DEFAULT_PAGE_SIZE), after.as_deref())
            .await
            .map_err(|e| e.extend())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_article(
        &self,
        ctx: &Context<'_>,
        input: ArticleInput,
    ) -> async_graphql::Result<Article> {
        let draft = ArticleDraft::try_from(input).map_err(|e| e.extend())?;
        let article = store(ctx)?.create(draft).await.map_err(|e| e.extend())?;
        info!("Article {} created", article.id);
        Ok(article)
    }

    async fn update_article(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: ArticleInput,
    ) -> async_graphql::Result<Article> {
        let draft = ArticleDraft::try_from(input).map_err(|e| e.extend())?;
        store(ctx)?.update(&id, draft).await.map_err(|e| e.extend())
    }

    /// Soft-delete an article. `false` when it does not exist.
    async fn delete_article(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        let deleted = store(ctx)?.soft_delete(&id).await.map_err(|e| e.extend())?;
        if deleted {
            info!("Article {} soft-deleted", id.as_str());
        }
        Ok(deleted)
    }
}
