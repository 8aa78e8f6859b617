//! Sports articles GraphQL backend.
//!
//! Reads configuration from the environment (`HOST`, `PORT`, `DATABASE_URL`,
//! `LOG_LEVEL`), runs migrations and serves `/graphql`.

use std::sync::Arc;

use tracing::{error, info};

use sports_articles::config::AppConfig;
use sports_articles::server::serve;
use sports_articles::store::init_database;
use sports_articles::telemetry::init_tracing;
use sports_articles::{build_schema, SeaOrmArticleStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();
    init_tracing(&config.log_level);

    info!("Starting sports articles backend...");

    let db = match init_database(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialise database: {}", e);
            return Err(e.into());
        }
    };

    let store = Arc::new(SeaOrmArticleStore::new(db.clone()));
    serve(&config, build_schema(store)).await?;

    if let Err(e) = db.close().await {
        error!("Error closing database connection: {}", e);
    }
    info!("Shutdown complete");
    Ok(())
}
