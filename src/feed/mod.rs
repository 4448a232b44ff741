mod fetcher;
mod view;

pub use fetcher::{HeadlineSource, NewsFetcher, RawArticle};
pub use view::{render_anchors, FeedView, PolarityBound};
