use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, Result};

/// One article as NewsAPI returns it. Every field may be absent or null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Anything but a string is treated as missing.
    #[serde(default, deserialize_with = "string_or_none")]
    pub published_at: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    articles: Vec<Value>,
    code: Option<String>,
    message: Option<String>,
}

/// Where the ingestion pipeline gets headlines from.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn fetch(&self, source_id: &str, sort_by: &str) -> Result<Vec<RawArticle>>;

    /// Fetch every source in order. A failing source is logged and skipped.
    async fn fetch_all(&self, sources: &[String], sort_by: &str) -> Vec<(String, Vec<RawArticle>)> {
        let mut results = Vec::with_capacity(sources.len());
        for source_id in sources {
            match self.fetch(source_id, sort_by).await {
                Ok(articles) => {
                    tracing::debug!("Fetched {} articles from {}", articles.len(), source_id);
                    results.push((source_id.clone(), articles));
                }
                Err(e) => {
                    tracing::warn!(source_id = %source_id, "Skipping source: {}", e);
                }
            }
        }
        results
    }
}

/// NewsAPI v1 `articles` client.
pub struct NewsFetcher {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NewsFetcher {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("good-news/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl HeadlineSource for NewsFetcher {
    async fn fetch(&self, source_id: &str, sort_by: &str) -> Result<Vec<RawArticle>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("source", source_id),
                ("sortBy", sort_by),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            // NewsAPI explains most failures in the body
            let detail = serde_json::from_slice::<NewsApiResponse>(&bytes)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_default();
            return Err(AppError::fetch(
                source_id,
                format!("HTTP {} {}", status, detail).trim_end().to_string(),
            ));
        }

        parse_articles(source_id, &bytes)
    }
}

/// Decode a NewsAPI body, rejecting anything whose `status` is not `ok`.
/// Articles that fail to decode are logged and dropped individually.
pub fn parse_articles(source_id: &str, body: &[u8]) -> Result<Vec<RawArticle>> {
    let response: NewsApiResponse = serde_json::from_slice(body)
        .map_err(|e| AppError::fetch(source_id, format!("undecodable response: {}", e)))?;

    if response.status != "ok" {
        return Err(AppError::fetch(
            source_id,
            format!(
                "API returned {} ({}): {}",
                response.status,
                response.code.as_deref().unwrap_or("no code"),
                response.message.as_deref().unwrap_or("no message"),
            ),
        ));
    }

    let total = response.articles.len();
    let articles: Vec<RawArticle> = response
        .articles
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(article) => Some(article),
            Err(e) => {
                tracing::warn!(source_id = %source_id, index, "Skipping malformed article: {}", e);
                None
            }
        })
        .collect();

    if articles.len() < total {
        tracing::info!(
            source_id = %source_id,
            "Kept {} of {} articles",
            articles.len(),
            total
        );
    }
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ok_response() {
        let body = br#"{
            "status": "ok",
            "source": "bbc-news",
            "sortBy": "top",
            "articles": [
                {
                    "author": "X",
                    "title": "Stocks crash",
                    "url": "http://a",
                    "urlToImage": "http://i",
                    "description": "d",
                    "publishedAt": "2024-03-01T10:00:00Z"
                },
                { "author": null, "title": "Untimed", "url": "http://b", "publishedAt": null }
            ]
        }"#;

        let articles = parse_articles("bbc-news", body).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(
            articles[0],
            RawArticle {
                author: Some("X".to_string()),
                title: Some("Stocks crash".to_string()),
                url: Some("http://a".to_string()),
                url_to_image: Some("http://i".to_string()),
                description: Some("d".to_string()),
                published_at: Some("2024-03-01T10:00:00Z".to_string()),
            }
        );
        assert!(articles[1].published_at.is_none());
        assert!(articles[1].url_to_image.is_none());
    }

    #[test]
    fn malformed_articles_are_skipped_individually() {
        let body = br#"{
            "status": "ok",
            "articles": [
                { "title": "Fine", "url": "http://a", "publishedAt": "2024-03-01T10:00:00Z" },
                { "title": "Epoch time", "url": "http://b", "publishedAt": 1709287200 },
                { "title": "Two authors", "url": "http://c", "author": ["A", "B"] }
            ]
        }"#;

        let articles = parse_articles("bbc-news", body).unwrap();
        let titles: Vec<&str> = articles.iter().filter_map(|a| a.title.as_deref()).collect();
        assert_eq!(titles, vec!["Fine", "Epoch time"]);
        assert_eq!(articles[0].published_at.as_deref(), Some("2024-03-01T10:00:00Z"));
        assert!(articles[1].published_at.is_none());
    }

    #[test]
    fn error_status_is_a_fetch_error() {
        let body = br#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#;
        match parse_articles("cnn", body) {
            Err(AppError::Fetch { source_id, message }) => {
                assert_eq!(source_id, "cnn");
                assert!(message.contains("apiKeyInvalid"));
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[test]
    fn garbage_body_is_a_fetch_error() {
        assert!(matches!(
            parse_articles("cnn", b"<html>502</html>"),
            Err(AppError::Fetch { .. })
        ));
    }

    struct FlakySource;

    #[async_trait]
    impl HeadlineSource for FlakySource {
        async fn fetch(&self, source_id: &str, _sort_by: &str) -> Result<Vec<RawArticle>> {
            if source_id == "down" {
                return Err(AppError::fetch(source_id, "connection refused"));
            }
            Ok(vec![RawArticle {
                title: Some(format!("{} headline", source_id)),
                ..Default::default()
            }])
        }
    }

    #[tokio::test]
    async fn fetch_all_skips_failed_sources() {
        let sources: Vec<String> = ["a", "down", "b"].iter().map(|s| s.to_string()).collect();
        let results = FlakySource.fetch_all(&sources, "top").await;

        let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    async fn fake_news_api() -> String {
        use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
        use std::collections::HashMap;

        async fn articles(Query(query): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
            if query.get("apiKey").map(String::as_str) != Some("secret") {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({
                        "status": "error",
                        "code": "apiKeyInvalid",
                        "message": "Your API key is invalid."
                    })),
                );
            }
            let title = format!(
                "{} sorted by {}",
                query.get("source").cloned().unwrap_or_default(),
                query.get("sortBy").cloned().unwrap_or_default()
            );
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "ok",
                    "articles": [{ "title": title, "publishedAt": "2024-03-01T10:00:00Z" }]
                })),
            )
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/v1/articles", get(articles));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1/articles", addr)
    }

    fn fetcher(base_url: &str, api_key: &str) -> NewsFetcher {
        NewsFetcher::new(base_url, api_key, Duration::from_secs(5), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetch_sends_source_sort_and_key() {
        let base_url = fake_news_api().await;
        let articles = fetcher(&base_url, "secret").fetch("bbc-news", "top").await.unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title.as_deref(), Some("bbc-news sorted by top"));
    }

    #[tokio::test]
    async fn rejected_key_is_a_fetch_error_with_api_message() {
        let base_url = fake_news_api().await;
        match fetcher(&base_url, "wrong").fetch("cnn", "top").await {
            Err(AppError::Fetch { source_id, message }) => {
                assert_eq!(source_id, "cnn");
                assert!(message.contains("401"));
                assert!(message.contains("Your API key is invalid."));
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_skipped() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = fetcher(&format!("http://{}/v1/articles", addr), "secret");
        assert!(matches!(
            fetcher.fetch("cnn", "top").await,
            Err(AppError::Http(_))
        ));

        let sources = vec!["cnn".to_string()];
        assert!(fetcher.fetch_all(&sources, "top").await.is_empty());
    }

    #[test]
    fn builds_client_with_timeouts() {
        let fetcher = NewsFetcher::new(
            "https://newsapi.org/v1/articles",
            "key",
            Duration::from_secs(30),
            Duration::from_secs(10),
        );
        assert!(fetcher.is_ok());
    }
}
