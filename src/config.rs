use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::error::{AppError, Result};

pub const DEFAULT_SOURCES: [&str; 10] = [
    "associated-press",
    "bbc-news",
    "bloomberg",
    "cnn",
    "google-news",
    "hacker-news",
    "the-new-york-times",
    "the-telegraph",
    "the-wall-street-journal",
    "the-washington-post",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub news_api_key: Option<String>,

    #[serde(default = "default_news_api_url")]
    pub news_api_url: String,

    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Takes precedence over `db_path` when set, e.g. from `DATABASE_URL`.
    pub database_url: Option<String>,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub training: TrainingConfig,
}

/// Daily trigger times, `HH:MM` in UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_ingest_at")]
    pub ingest_at: String,
    #[serde(default = "default_backfill_at")]
    pub backfill_at: String,
}

/// Feed view cutoffs. All comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_bad_polarity")]
    pub bad_polarity: f64,
    #[serde(default)]
    pub good_polarity: f64,
    #[serde(default = "default_max_subjectivity")]
    pub max_subjectivity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_positive_path")]
    pub positive_path: String,
    #[serde(default = "default_negative_path")]
    pub negative_path: String,
    #[serde(default = "default_folds")]
    pub folds: usize,
    #[serde(default = "default_max_ngram")]
    pub max_ngram: usize,
}

fn default_news_api_url() -> String {
    "https://newsapi.org/v1/articles".to_string()
}

fn default_sort_by() -> String {
    "top".to_string()
}

fn default_sources() -> Vec<String> {
    DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect()
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("good-news");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("articles.db").to_string_lossy().to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_ingest_at() -> String {
    "00:00".to_string()
}

fn default_backfill_at() -> String {
    "00:30".to_string()
}

fn default_bad_polarity() -> f64 {
    -0.1
}

fn default_max_subjectivity() -> f64 {
    0.5
}

fn default_positive_path() -> String {
    "resources/positive_headlines.csv".to_string()
}

fn default_negative_path() -> String {
    "resources/negative_headlines.csv".to_string()
}

fn default_folds() -> usize {
    6
}

fn default_max_ngram() -> usize {
    7
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            ingest_at: default_ingest_at(),
            backfill_at: default_backfill_at(),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            bad_polarity: default_bad_polarity(),
            good_polarity: 0.0,
            max_subjectivity: default_max_subjectivity(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            positive_path: default_positive_path(),
            negative_path: default_negative_path(),
            folds: default_folds(),
            max_ngram: default_max_ngram(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            news_api_key: None,
            news_api_url: default_news_api_url(),
            sort_by: default_sort_by(),
            sources: default_sources(),
            db_path: default_db_path(),
            database_url: None,
            bind_addr: default_bind_addr(),
            static_dir: default_static_dir(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            schedule: ScheduleConfig::default(),
            thresholds: Thresholds::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl Config {
    /// Load the config file (writing defaults on first run), then apply
    /// `NEWS_API_KEY`, `DATABASE_URL` and `PORT` from the environment.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("good-news")
            .join("config.toml")
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("NEWS_API_KEY").filter(|v| !v.is_empty()) {
            self.news_api_key = Some(key);
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse::<u16>().ok()) {
            let host = self
                .bind_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.bind_addr = format!("{}:{}", host, port);
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.news_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AppError::Config(format!(
                    "news_api_key is not set; add it to {} or export NEWS_API_KEY",
                    Self::config_path().display()
                ))
            })
    }

    /// Resolve the SQLite database file, preferring `database_url`.
    ///
    /// Accepts `sqlite:///abs/path`, `sqlite://rel/path`, `sqlite:path`
    /// or a bare path.
    pub fn database_path(&self) -> Result<String> {
        let Some(raw) = self.database_url.as_deref() else {
            return Ok(self.db_path.clone());
        };

        match Url::parse(raw) {
            Ok(url) if url.scheme() == "sqlite" => {
                let path = match url.host_str() {
                    Some(host) => format!("{}{}", host, url.path()),
                    None => url.path().to_string(),
                };
                if path.is_empty() {
                    return Err(AppError::Config(format!("database_url has no path: {}", raw)));
                }
                Ok(path)
            }
            Ok(url) if url.scheme().len() > 1 => Err(AppError::Config(format!(
                "unsupported database scheme '{}', expected sqlite",
                url.scheme()
            ))),
            // Not a URL (or a Windows drive letter): treat as a file path
            _ => Ok(raw.to_string()),
        }
    }
}
