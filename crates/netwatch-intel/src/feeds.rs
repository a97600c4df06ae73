//! Threat feed aggregation and feed-based domain reputation.

use netwatch_core::{
    score, DomainReputation, FeedAdapter, FeedItem, FeedMatch, IntelError, Result, ThreatLevel,
};
use std::cmp::Reverse;
use tracing::{info, instrument, warn};

use crate::sequencer::fan_out;

/// Matches included in a reputation response
const MATCH_SAMPLE: usize = 5;

/// A feed and how many of its items make it into the merged list
pub struct FeedSource {
    adapter: Box<FeedAdapter>,
    limit: usize,
}

impl FeedSource {
    pub fn new(adapter: Box<FeedAdapter>, limit: usize) -> Self {
        Self { adapter, limit }
    }
}

/// Merged feed items plus the feeds that contributed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedFeeds {
    /// Items, newest first
    pub items: Vec<FeedItem>,
    /// Feeds that answered, in declaration order
    pub sources: Vec<&'static str>,
}

/// Runs every feed concurrently and merges what comes back
pub struct FeedAggregator {
    adapters: Vec<Box<FeedAdapter>>,
    limits: Vec<usize>,
}

impl FeedAggregator {
    pub fn new(sources: Vec<FeedSource>) -> Self {
        let (adapters, limits) = sources.into_iter().map(|s| (s.adapter, s.limit)).unzip();
        Self { adapters, limits }
    }

    /// Current items from every feed that answered.
    ///
    /// A failed feed contributes nothing; when all fail the list is empty.
    /// Items sort newest first; undated items go last and ties keep feed
    /// order.
    #[instrument(skip(self))]
    pub async fn collect(&self) -> MergedFeeds {
        let outcomes = fan_out(&self.adapters, &()).await;

        let mut items = Vec::new();
        let mut sources = Vec::new();
        for ((provider, outcome), limit) in outcomes.into_iter().zip(&self.limits) {
            if let Ok(feed) = outcome {
                sources.push(provider);
                items.extend(feed.into_iter().take(*limit));
            }
        }
        items.sort_by_cached_key(|item| Reverse(item.published()));

        info!(items = items.len(), feeds = sources.len(), "feeds merged");
        MergedFeeds { items, sources }
    }

    /// Every item one feed currently returns, without the merge limit.
    ///
    /// `None` when no feed is named `provider`; a failed feed yields an empty
    /// list.
    #[instrument(skip(self))]
    pub async fn single(&self, provider: &str) -> Option<Vec<FeedItem>> {
        let adapter = self.adapters.iter().find(|a| a.name() == provider)?;
        match adapter.fetch(&()).await {
            Ok(items) => Some(items),
            Err(e) => {
                warn!(provider, error = %e, "feed unavailable");
                Some(Vec::new())
            }
        }
    }

    /// Score a domain by how often current feeds mention it.
    ///
    /// Fails open: if no feed answered the domain is reported clean with an
    /// explanatory error and an `Unknown` level.
    #[instrument(skip(self))]
    pub async fn reputation(&self, domain: &str) -> Result<DomainReputation> {
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(IntelError::invalid("Domain required"));
        }

        let feeds = self.collect().await;
        if feeds.sources.is_empty() && !self.adapters.is_empty() {
            warn!(domain, "no feed available for reputation check");
            return Ok(DomainReputation {
                domain: domain.to_string(),
                threat_score: 0,
                threat_level: ThreatLevel::Unknown,
                match_count: 0,
                matches: Vec::new(),
                is_clean: true,
                error: Some("Unable to check reputation".to_string()),
            });
        }

        let matches: Vec<FeedItem> = feeds
            .items
            .into_iter()
            .filter(|item| item.mentions(domain))
            .collect();
        let (threat_score, threat_level) = score::domain_reputation(&matches);

        Ok(DomainReputation {
            domain: domain.to_string(),
            threat_score,
            threat_level,
            match_count: matches.len(),
            matches: matches.iter().take(MATCH_SAMPLE).map(FeedMatch::from).collect(),
            is_clean: matches.is_empty(),
            error: None,
        })
    }
}
