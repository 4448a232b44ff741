use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Sentiment;

/// A stored headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub article_id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub description: Option<String>,
    pub publish_time: Option<NaiveDateTime>,
    pub time_created: NaiveDateTime,
    pub polarity: Option<f64>,
    pub subjectivity: Option<f64>,
    /// Derived from `polarity` and `subjectivity`; not a column of its own.
    #[serde(skip_deserializing)]
    pub sentiment: Option<Sentiment>,
}

impl Article {
    pub fn is_scored(&self) -> bool {
        self.polarity.is_some() && self.subjectivity.is_some()
    }
}

/// Insert payload; the store assigns `article_id` and `time_created`.
#[derive(Debug, Clone, Default)]
pub struct NewArticle {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub description: Option<String>,
    pub publish_time: Option<NaiveDateTime>,
    pub sentiment: Option<Sentiment>,
}
