use chrono::NaiveDateTime;
use rusqlite::{params, params_from_iter, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::feed::{FeedView, PolarityBound};
use crate::models::{Article, NewArticle, Sentiment};

use super::schema::SCHEMA;

const ARTICLE_COLUMNS: &str = "article_id, title, author, url, url_to_image, description, \
                               publish_time, time_created, polarity, subjectivity";

const STORE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Client for the article store. Each call is its own unit of work.
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn).await
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    pub async fn insert_article(&self, article: NewArticle) -> Result<i64> {
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO articles (title, author, url, url_to_image, description,
                                             publish_time, polarity, subjectivity)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
                    params![
                        article.title,
                        article.author,
                        article.url,
                        article.url_to_image,
                        article.description,
                        article
                            .publish_time
                            .map(|dt| dt.format(STORE_TIME_FORMAT).to_string()),
                        article.sentiment.map(|s| s.polarity),
                        article.sentiment.map(|s| s.subjectivity),
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    /// Every stored article in insertion order.
    pub async fn all_articles(&self) -> Result<Vec<Article>> {
        self.select(format!("SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY article_id"), Vec::new())
            .await
    }

    /// Articles passing the view's threshold filter, in `article_id` order.
    /// Dedup and final ordering are left to [`FeedView::curate`].
    pub async fn feed_candidates(&self, view: &FeedView) -> Result<Vec<Article>> {
        let mut clauses = vec![
            "polarity IS NOT NULL".to_string(),
            "subjectivity IS NOT NULL".to_string(),
            "subjectivity < ?".to_string(),
        ];
        let mut values = vec![view.max_subjectivity];

        match view.polarity {
            PolarityBound::Above(min) => {
                clauses.push("polarity > ?".to_string());
                values.push(min);
            }
            PolarityBound::Below(max) => {
                clauses.push("polarity < ?".to_string());
                values.push(max);
            }
        }

        if view.require_publish_time {
            clauses.push("publish_time IS NOT NULL".to_string());
        }

        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE {} ORDER BY article_id",
            clauses.join(" AND ")
        );
        self.select(sql, values).await
    }

    /// Articles still missing either sentiment score.
    pub async fn unscored_articles(&self) -> Result<Vec<Article>> {
        self.select(
            format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles \
                 WHERE polarity IS NULL OR subjectivity IS NULL ORDER BY article_id"
            ),
            Vec::new(),
        )
        .await
    }

    /// Store a score on one row, only if it is still unscored.
    /// Returns whether the row was changed.
    pub async fn apply_sentiment(&self, article_id: i64, sentiment: Sentiment) -> Result<bool> {
        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    r#"UPDATE articles SET polarity = ?1, subjectivity = ?2
                       WHERE article_id = ?3 AND (polarity IS NULL OR subjectivity IS NULL)"#,
                    params![sentiment.polarity, sentiment.subjectivity, article_id],
                )?;
                Ok(changed)
            })
            .await?;
        Ok(changed > 0)
    }

    pub async fn count_articles(&self) -> Result<i64> {
        let count = self
            .conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }

    #[cfg(test)]
    pub async fn execute_batch(&self, sql: &'static str) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute_batch(sql)?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn select(&self, sql: String, values: Vec<f64>) -> Result<Vec<Article>> {
        let articles = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let articles = stmt
                    .query_map(params_from_iter(values), article_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }
}

fn parse_datetime(column: usize, s: &str) -> rusqlite::Result<NaiveDateTime> {
    // `%.f` also accepts a missing fraction ("2024-01-11 12:34:56")
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn article_from_row(row: &Row) -> rusqlite::Result<Article> {
    let polarity: Option<f64> = row.get(8)?;
    let subjectivity: Option<f64> = row.get(9)?;
    let sentiment = match (polarity, subjectivity) {
        (Some(polarity), Some(subjectivity)) => Some(Sentiment {
            polarity,
            subjectivity,
        }),
        _ => None,
    };

    Ok(Article {
        article_id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        url: row.get(3)?,
        url_to_image: row.get(4)?,
        description: row.get(5)?,
        publish_time: row
            .get::<_, Option<String>>(6)?
            .map(|s| parse_datetime(6, &s))
            .transpose()?,
        time_created: parse_datetime(7, &row.get::<_, String>(7)?)?,
        polarity,
        subjectivity,
        sentiment,
    })
}
