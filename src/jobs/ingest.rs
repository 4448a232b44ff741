use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::feed::{HeadlineSource, RawArticle};
use crate::models::NewArticle;
use crate::sentiment::Scorer;

use super::Job;

const PUBLISH_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Fetch, score and store headlines from every configured source.
pub struct Ingestor {
    repository: Arc<Repository>,
    source: Arc<dyn HeadlineSource>,
    scorer: Scorer,
    sources: Vec<String>,
    sort_by: String,
}

impl Ingestor {
    pub fn new(
        repository: Arc<Repository>,
        source: Arc<dyn HeadlineSource>,
        scorer: Scorer,
        sources: Vec<String>,
        sort_by: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            source,
            scorer,
            sources,
            sort_by: sort_by.into(),
        }
    }

    /// Run one ingestion pass and return how many articles were stored.
    ///
    /// Failed sources and failed inserts are logged and skipped. The same
    /// headline fetched twice is stored twice.
    pub async fn ingest(&self) -> Result<usize> {
        let feeds = self.source.fetch_all(&self.sources, &self.sort_by).await;
        tracing::info!(
            "Fetched {} of {} sources",
            feeds.len(),
            self.sources.len()
        );

        let mut stored = 0;
        for (source_id, articles) in feeds {
            for raw in articles {
                let title = raw.title.clone();
                match self.repository.insert_article(self.prepare(raw)).await {
                    Ok(_) => stored += 1,
                    Err(e) => tracing::warn!(
                        source_id = %source_id,
                        title = title.as_deref().unwrap_or_default(),
                        "Failed to store article: {}",
                        e
                    ),
                }
            }
        }

        tracing::info!("Ingestion stored {} articles", stored);
        Ok(stored)
    }

    fn prepare(&self, raw: RawArticle) -> NewArticle {
        let publish_time = raw.published_at.as_deref().and_then(|s| match parse_publish_time(s) {
            Ok(dt) => Some(dt),
            Err(e) => {
                tracing::debug!("{}; storing without publish time", e);
                None
            }
        });
        let sentiment = self.scorer.score_title(raw.title.as_deref());

        NewArticle {
            title: raw.title,
            author: raw.author,
            url: raw.url,
            url_to_image: raw.url_to_image,
            description: raw.description,
            publish_time,
            sentiment: Some(sentiment),
        }
    }
}

#[async_trait]
impl Job for Ingestor {
    fn name(&self) -> &str {
        "ingest"
    }

    async fn run(&self) -> Result<usize> {
        self.ingest().await
    }
}

/// Parse a feed timestamp, keeping only its first 19 characters so
/// fractional seconds and zone suffixes are dropped.
pub fn parse_publish_time(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    let truncated = trimmed
        .char_indices()
        .nth(19)
        .map(|(idx, _)| &trimmed[..idx])
        .unwrap_or(trimmed);

    NaiveDateTime::parse_from_str(truncated, PUBLISH_TIME_FORMAT)
        .map_err(|e| AppError::Timestamp(format!("'{}': {}", raw, e)))
}
