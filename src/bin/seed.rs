//! Seed the configured database with demo articles.

use tracing::{error, info};

use sports_articles::config::AppConfig;
use sports_articles::seed::seed_articles;
use sports_articles::store::init_database;
use sports_articles::telemetry::init_tracing;
use sports_articles::SeaOrmArticleStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();
    init_tracing(&config.log_level);

    let db = init_database(&config.database_url).await?;
    let store = SeaOrmArticleStore::new(db);

    match seed_articles(&store, config.seed_count).await {
        Ok(inserted) => {
            info!("Inserted {} articles", inserted);
            Ok(())
        }
        Err(e) => {
            error!("Seeding failed: {}", e);
            Err(e.into())
        }
    }
}
