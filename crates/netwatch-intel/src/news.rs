//! News search.

use netwatch_core::{NewsAdapter, NewsDigest, Result};
use tracing::instrument;

/// Topic searched when the caller gives none
pub const DEFAULT_TOPIC: &str = "cybersecurity";

/// News headlines for a topic
pub struct NewsSearch {
    source: Box<NewsAdapter>,
}

impl NewsSearch {
    pub fn new(source: Box<NewsAdapter>) -> Self {
        Self { source }
    }

    /// Latest articles for `topic`, or for [`DEFAULT_TOPIC`] when blank
    #[instrument(skip(self))]
    pub async fn search(&self, topic: Option<&str>) -> Result<NewsDigest> {
        let topic = topic
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TOPIC);

        let articles = self.source.fetch(topic).await?;
        Ok(NewsDigest {
            topic: topic.to_string(),
            count: articles.len(),
            articles,
        })
    }
}
