use serde::{Deserialize, Serialize};

/// A news article mentioning a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    /// Headline without the trailing publisher suffix
    pub title: String,
    /// Publisher
    pub source: String,
    /// Article link
    pub link: String,
    /// Publication date as published
    pub pub_date: String,
    /// Publication time in milliseconds since the epoch
    pub timestamp: Option<i64>,
}

/// Articles returned for one topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDigest {
    /// Search topic
    pub topic: String,
    /// Number of articles
    pub count: usize,
    /// Articles in feed order
    pub articles: Vec<NewsArticle>,
}
