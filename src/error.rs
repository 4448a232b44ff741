use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database error: {0}")]
    AsyncDatabase(#[from] tokio_rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// One news source could not be fetched or decoded.
    #[error("Fetch failed for {source_id}: {message}")]
    Fetch { source_id: String, message: String },

    #[error("Invalid publish time: {0}")]
    Timestamp(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn fetch(source_id: &str, message: impl Into<String>) -> Self {
        AppError::Fetch {
            source_id: source_id.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
