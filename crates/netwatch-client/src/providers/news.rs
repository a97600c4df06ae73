//! Google News RSS search.

use async_trait::async_trait;
use netwatch_core::time::parse_date;
use netwatch_core::{NewsArticle, SourceAdapter, SourceResult};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::instrument;

use crate::config::ProviderConfig;
use crate::transport::{endpoint, HttpTransport};

const ARTICLE_LIMIT: usize = 15;
const DEFAULT_PUBLISHER: &str = "Google News";

/// Google News search feed for a topic
pub struct GoogleNews {
    transport: HttpTransport,
    base_url: String,
    timeout: Duration,
}

impl GoogleNews {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self {
            transport,
            base_url: config.endpoints.google_news.clone(),
            timeout: config.timeouts.news(),
        }
    }
}

#[async_trait]
impl SourceAdapter<str> for GoogleNews {
    type Fragment = Vec<NewsArticle>;

    fn name(&self) -> &'static str {
        "Google News"
    }

    #[instrument(skip(self), fields(provider = "Google News"))]
    async fn fetch(&self, topic: &str) -> SourceResult<Vec<NewsArticle>> {
        let url = endpoint(self.name(), &self.base_url, &["rss", "search"])?;
        let request = self.transport.get(url).query(&[
            ("q", topic),
            ("hl", "en-US"),
            ("gl", "US"),
            ("ceid", "US:en"),
        ]);
        let xml = self.transport.text(self.name(), request, self.timeout).await?;

        Ok(parse_rss(&xml))
    }
}

fn item_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<item>(.*?)</item>").expect("valid item pattern"))
}

fn tag_pattern(tag: &'static str) -> Regex {
    Regex::new(&format!(r"(?s)<{tag}(?:\s[^>]*)?>(.*?)</{tag}>")).expect("valid tag pattern")
}

struct Tags {
    title: Regex,
    source: Regex,
    link: Regex,
    pub_date: Regex,
}

fn tags() -> &'static Tags {
    static TAGS: OnceLock<Tags> = OnceLock::new();
    TAGS.get_or_init(|| Tags {
        title: tag_pattern("title"),
        source: tag_pattern("source"),
        link: tag_pattern("link"),
        pub_date: tag_pattern("pubDate"),
    })
}

/// Extract the first `ARTICLE_LIMIT` items of an RSS document
fn parse_rss(xml: &str) -> Vec<NewsArticle> {
    let tags = tags();
    item_pattern()
        .captures_iter(xml)
        .take(ARTICLE_LIMIT)
        .filter_map(|item| item.get(1))
        .map(|item| {
            let item = item.as_str();
            let field = |pattern: &Regex| {
                pattern
                    .captures(item)
                    .and_then(|c| c.get(1))
                    .map(|m| decode(m.as_str()))
                    .unwrap_or_default()
            };

            let publisher = field(&tags.source);
            let mut title = field(&tags.title);
            if !publisher.is_empty() {
                let suffix = format!(" - {publisher}");
                if let Some(stripped) = title.strip_suffix(&suffix) {
                    title = stripped.to_string();
                }
            }
            let pub_date = field(&tags.pub_date);

            NewsArticle {
                title,
                source: if publisher.is_empty() {
                    DEFAULT_PUBLISHER.to_string()
                } else {
                    publisher
                },
                link: field(&tags.link),
                timestamp: parse_date(&pub_date).map(|d| d.timestamp_millis()),
                pub_date,
            }
        })
        .collect()
}

/// Strip CDATA wrappers and decode the XML entities RSS feeds use
fn decode(raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix("<![CDATA[")
        .and_then(|r| r.strip_suffix("]]>"))
        .unwrap_or(raw);

    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
