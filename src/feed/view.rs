use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::Thresholds;
use crate::models::Article;

/// Which side of a polarity threshold an article must fall on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolarityBound {
    /// Strictly greater than the value.
    Above(f64),
    /// Strictly less than the value.
    Below(f64),
}

/// A named filter, dedup and ordering policy over stored articles.
///
/// The store applies the threshold filter; [`FeedView::curate`] applies the
/// title dedup and the ordering so both renderings share one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedView {
    pub polarity: PolarityBound,
    /// Strict upper bound on subjectivity.
    pub max_subjectivity: f64,
    pub require_publish_time: bool,
}

impl FeedView {
    pub fn bad_news(thresholds: &Thresholds) -> Self {
        Self {
            polarity: PolarityBound::Below(thresholds.bad_polarity),
            max_subjectivity: thresholds.max_subjectivity,
            require_publish_time: true,
        }
    }

    pub fn good_news(thresholds: &Thresholds) -> Self {
        Self {
            polarity: PolarityBound::Above(thresholds.good_polarity),
            max_subjectivity: thresholds.max_subjectivity,
            require_publish_time: true,
        }
    }

    /// Same check the store runs in SQL, for callers holding articles in memory.
    pub fn matches(&self, article: &Article) -> bool {
        let (Some(polarity), Some(subjectivity)) = (article.polarity, article.subjectivity) else {
            return false;
        };
        let polarity_ok = match self.polarity {
            PolarityBound::Above(min) => polarity > min,
            PolarityBound::Below(max) => polarity < max,
        };
        polarity_ok
            && subjectivity < self.max_subjectivity
            && (!self.require_publish_time || article.publish_time.is_some())
    }

    /// Dedup by title and order newest first.
    ///
    /// Among articles sharing a title the one with the lowest `article_id`
    /// survives. Articles without a title are treated as sharing one.
    /// Ordering is `publish_time` descending with nulls last, then
    /// `time_created` descending, then `article_id` descending.
    pub fn curate(&self, mut articles: Vec<Article>) -> Vec<Article> {
        articles.retain(|a| self.matches(a));
        articles.sort_by_key(|a| a.article_id);

        let mut seen = HashSet::new();
        articles.retain(|a| seen.insert(a.title.clone()));

        articles.sort_by(newest_first);
        articles
    }
}

fn newest_first(a: &Article, b: &Article) -> Ordering {
    let by_publish = match (&a.publish_time, &b.publish_time) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_publish
        .then_with(|| b.time_created.cmp(&a.time_created))
        .then_with(|| b.article_id.cmp(&a.article_id))
}

/// Render articles as `<a>` anchors joined by `<br/>`.
pub fn render_anchors(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|article| {
            format!(
                "<a href=\"{}\">{}</a>",
                escape_html(article.url.as_deref().unwrap_or_default()),
                escape_html(article.title.as_deref().unwrap_or_default()),
            )
        })
        .collect::<Vec<_>>()
        .join("<br/>")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
