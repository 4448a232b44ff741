//! HTTP routes over the article store.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::Thresholds;
use crate::db::Repository;
use crate::error::AppError;
use crate::feed::{render_anchors, FeedView};
use crate::models::Article;

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<Repository>,
    pub thresholds: Thresholds,
}

/// Store failures become a bare 500; the detail only goes to the log.
struct ServerError(AppError);

impl From<AppError> for ServerError {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

pub fn router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let static_dir = static_dir.as_ref();

    Router::new()
        .route("/", get(liveness))
        .route("/unsortedlist", get(unsorted_list))
        .route("/badnewsjson", get(bad_news_json))
        .route("/goodnewsjson", get(good_news_json))
        .route_service("/goodnews", ServeFile::new(static_dir.join("views/goodnews.html")))
        .route_service("/badnews", ServeFile::new(static_dir.join("views/badnews.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn liveness() -> &'static str {
    "200 OK"
}

/// GET /unsortedlist - every stored article as an anchor, no filtering
async fn unsorted_list(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    let articles = state.repository.all_articles().await?;
    Ok(Html(render_anchors(&articles)))
}

/// GET /badnewsjson
async fn bad_news_json(State(state): State<AppState>) -> Result<Json<Vec<Article>>, ServerError> {
    let view = FeedView::bad_news(&state.thresholds);
    Ok(Json(curated(&state, &view).await?))
}

/// GET /goodnewsjson
async fn good_news_json(State(state): State<AppState>) -> Result<Json<Vec<Article>>, ServerError> {
    let view = FeedView::good_news(&state.thresholds);
    Ok(Json(curated(&state, &view).await?))
}

async fn curated(state: &AppState, view: &FeedView) -> Result<Vec<Article>, AppError> {
    let candidates = state.repository.feed_candidates(view).await?;
    Ok(view.curate(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::NaiveDate;
    use tower::ServiceExt;

    use crate::models::{NewArticle, Sentiment};

    fn headline(title: &str, polarity: f64, day: u32) -> NewArticle {
        NewArticle {
            title: Some(title.to_string()),
            url: Some(format!("http://news.example/{}", day)),
            publish_time: NaiveDate::from_ymd_opt(2024, 1, day).and_then(|d| d.and_hms_opt(8, 0, 0)),
            sentiment: Some(Sentiment {
                polarity,
                subjectivity: 0.2,
            }),
            ..Default::default()
        }
    }

    async fn app_with(articles: Vec<NewArticle>) -> (Router, Arc<Repository>, tempfile::TempDir) {
        let repository = Arc::new(Repository::open_in_memory().await.unwrap());
        for article in articles {
            repository.insert_article(article).await.unwrap();
        }
        let static_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(static_dir.path().join("views")).unwrap();
        std::fs::write(
            static_dir.path().join("views/goodnews.html"),
            "<html>good</html>",
        )
        .unwrap();

        let state = AppState {
            repository: repository.clone(),
            thresholds: Thresholds::default(),
        };
        (router(state, static_dir.path()), repository, static_dir)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn liveness_says_ok() {
        let (app, _, _dir) = app_with(Vec::new()).await;
        assert_eq!(get(app, "/").await, (StatusCode::OK, "200 OK".to_string()));
    }

    #[tokio::test]
    async fn unsorted_list_renders_every_article() {
        let (app, _, _dir) = app_with(vec![
            headline("Good day", 0.5, 1),
            headline("Bad day", -0.5, 2),
        ])
        .await;

        let (status, body) = get(app, "/unsortedlist").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            "<a href=\"http://news.example/1\">Good day</a><br/><a href=\"http://news.example/2\">Bad day</a>"
        );
    }

    #[tokio::test]
    async fn good_news_json_is_filtered_deduped_and_ordered() {
        let (app, _, _dir) = app_with(vec![
            headline("Older", 0.5, 1),
            headline("Newer", 0.5, 3),
            headline("Newer", 0.5, 2),
            headline("Bad", -0.5, 4),
        ])
        .await;

        let (status, body) = get(app, "/goodnewsjson").await;
        assert_eq!(status, StatusCode::OK);

        let rows: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
        let titles: Vec<&str> = rows.iter().filter_map(|r| r["title"].as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
        assert_eq!(rows[0]["article_id"], 2);
        assert_eq!(rows[0]["sentiment"]["polarity"], 0.5);
        assert_eq!(rows[0]["publish_time"], "2024-01-03T08:00:00");
        assert!(rows[0].get("time_created").is_some());
    }

    #[tokio::test]
    async fn bad_news_json_only_has_negative_articles() {
        let (app, _, _dir) = app_with(vec![headline("Good", 0.5, 1), headline("Bad", -0.5, 2)]).await;

        let (_, body) = get(app, "/badnewsjson").await;
        let rows: Vec<Article> = serde_json::from_str(&body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title.as_deref(), Some("Bad"));
    }

    #[tokio::test]
    async fn store_failure_is_a_500_without_detail() {
        let (app, repository, _dir) = app_with(Vec::new()).await;
        repository.execute_batch("DROP TABLE articles").await.unwrap();

        let (status, body) = get(app, "/goodnewsjson").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("articles"));
    }

    #[tokio::test]
    async fn serves_static_pages() {
        let (app, _, _dir) = app_with(Vec::new()).await;
        let (status, body) = get(app.clone(), "/goodnews").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html>good</html>");

        let (status, _) = get(app, "/badnews").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
