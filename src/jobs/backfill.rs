use std::sync::Arc;

use async_trait::async_trait;

use crate::db::Repository;
use crate::error::Result;
use crate::sentiment::Scorer;

use super::Job;

/// Scores stored articles that are still missing sentiment.
pub struct Backfiller {
    repository: Arc<Repository>,
    scorer: Scorer,
}

impl Backfiller {
    pub fn new(repository: Arc<Repository>, scorer: Scorer) -> Self {
        Self { repository, scorer }
    }

    /// Returns the number of rows updated. A second run right after a
    /// successful one updates nothing.
    pub async fn backfill(&self) -> Result<usize> {
        let pending = self.repository.unscored_articles().await?;
        if pending.is_empty() {
            tracing::info!("No unscored articles found");
            return Ok(0);
        }

        let mut updated = 0;
        for article in &pending {
            let sentiment = self.scorer.score_title(article.title.as_deref());
            match self
                .repository
                .apply_sentiment(article.article_id, sentiment)
                .await
            {
                Ok(true) => updated += 1,
                Ok(false) => tracing::debug!(
                    article_id = article.article_id,
                    "Article was scored by someone else"
                ),
                Err(e) => tracing::warn!(
                    article_id = article.article_id,
                    "Failed to store sentiment: {}",
                    e
                ),
            }
        }

        tracing::info!("Backfill scored {} of {} articles", updated, pending.len());
        Ok(updated)
    }
}

#[async_trait]
impl Job for Backfiller {
    fn name(&self) -> &str {
        "backfill"
    }

    async fn run(&self) -> Result<usize> {
        self.backfill().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewArticle, Sentiment};

    async fn seeded(titles: &[Option<&str>]) -> Arc<Repository> {
        let repository = Arc::new(Repository::open_in_memory().await.unwrap());
        for title in titles {
            repository
                .insert_article(NewArticle {
                    title: title.map(str::to_string),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        repository
    }

    #[tokio::test]
    async fn second_run_updates_nothing() {
        let repository = seeded(&[Some("Stocks crash"), Some("Dog rescued"), Some("Budget vote")]).await;
        let backfiller = Backfiller::new(repository.clone(), Scorer::default());

        assert_eq!(backfiller.backfill().await.unwrap(), 3);
        assert_eq!(backfiller.backfill().await.unwrap(), 0);
        assert!(repository.unscored_articles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn leaves_scored_rows_alone() {
        let repository = seeded(&[Some("Stocks crash")]).await;
        repository
            .insert_article(NewArticle {
                title: Some("Stocks crash".to_string()),
                sentiment: Some(Sentiment {
                    polarity: 0.9,
                    subjectivity: 0.9,
                }),
                ..Default::default()
            })
            .await
            .unwrap();

        let backfiller = Backfiller::new(repository.clone(), Scorer::default());
        assert_eq!(backfiller.backfill().await.unwrap(), 1);

        let articles = repository.all_articles().await.unwrap();
        assert!(articles[0].polarity.unwrap() < 0.0);
        assert_eq!(articles[1].polarity, Some(0.9));
    }

    #[tokio::test]
    async fn untitled_rows_get_neutral_sentiment() {
        let repository = seeded(&[None]).await;
        let backfiller = Backfiller::new(repository.clone(), Scorer::default());

        assert_eq!(backfiller.run().await.unwrap(), 1);
        let article = &repository.all_articles().await.unwrap()[0];
        assert_eq!(article.sentiment, Some(Sentiment::NEUTRAL));
    }
}
