mod article;
mod sentiment;

pub use article::{Article, NewArticle};
pub use sentiment::Sentiment;
