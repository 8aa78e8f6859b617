//! HTTP transport: Axum router serving the GraphQL endpoint

use async_graphql::{Request, Response};
use axum::{
    extract::Extension,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::schema::ArticlesSchema;

/// Execute a GraphQL request against the shared schema
///
/// # Example
///
/// ```rust,no_run
/// use axum::{routing::post, Router};
/// use sports_articles::server::graphql_handler;
///
/// let app: Router = Router::new().route("/graphql", post(graphql_handler));
/// ```
pub async fn graphql_handler(
    Extension(schema): Extension<ArticlesSchema>,
    req: Json<Request>,
) -> Json<Response> {
    Json(schema.execute(req.0).await)
}

async fn health() -> &'static str {
    "ok"
}

/// Router with `/graphql` and `/health`, CORS open to any origin
pub fn create_router(schema: ArticlesSchema) -> Router {
    Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/health", get(health))
        .layer(Extension(schema))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl+C
pub async fn serve(config: &AppConfig, schema: ArticlesSchema) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.address()).await?;
    info!("Backend ready on http://{}/graphql", config.address());

    axum::serve(listener, create_router(schema))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
}
