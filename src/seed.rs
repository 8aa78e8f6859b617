//! Demo data seeding

use tracing::info;

use crate::article::ArticleDraft;
use crate::store::ArticleStore;

/// Insert `count` demo articles unless the store already holds some.
///
/// Returns the number of articles inserted.
pub async fn seed_articles(store: &dyn ArticleStore, count: usize) -> crate::Result<usize> {
    let existing = store.count().await?;
    if existing > 0 {
        info!("Seed skipped: already have {} articles", existing);
        return Ok(0);
    }

    for i in 1..=count {
        let image_url = (i % 3 == 1).then(|| format!("https://picsum.photos/seed/{i}/800/400"));
        store
            .create(ArticleDraft::new(
                format!("Seeded article #{i}"),
                format!("This is the content for seeded article #{i}."),
                image_url,
            ))
            .await?;
    }

    info!("Seed completed: {} articles", count);
    Ok(count)
}
