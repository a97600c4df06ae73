use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::parse_date;

/// Severity attached to a feed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// No threat
    Clean,
    /// Low confidence or low impact
    Medium,
    /// Confirmed but not critical
    High,
    /// Confirmed and actively dangerous
    Critical,
}

/// One entry of a threat feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Provider-scoped identifier
    pub id: String,

    /// Headline
    pub title: String,

    /// Category tag ("Malware", "Phishing", ...)
    #[serde(rename = "type")]
    pub category: String,

    /// Publication date as reported by the provider
    pub date: String,

    /// Severity
    pub severity: Severity,

    /// Free-text description
    pub description: String,

    /// Tags
    pub tags: Vec<String>,

    /// Feed name
    pub source: String,

    /// Indicators of compromise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iocs: Option<Vec<String>>,
}

impl FeedItem {
    /// Parsed publication timestamp, if the date is recognizable
    #[must_use]
    pub fn published(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.date)
    }

    /// Returns true if the item references `domain`.
    ///
    /// Items that carry an IOC list are matched on their IOCs only; items
    /// without one fall back to the description. Matching is a
    /// case-insensitive substring test.
    #[must_use]
    pub fn mentions(&self, domain: &str) -> bool {
        let needle = domain.to_lowercase();
        match &self.iocs {
            Some(iocs) => iocs.iter().any(|ioc| ioc.to_lowercase().contains(&needle)),
            None => self.description.to_lowercase().contains(&needle),
        }
    }
}

/// Condensed view of a feed item used in reputation responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMatch {
    /// Headline
    pub title: String,
    /// Category tag
    #[serde(rename = "type")]
    pub category: String,
    /// Severity
    pub severity: Severity,
    /// Feed name
    pub source: String,
    /// Publication date
    pub date: String,
}

impl From<&FeedItem> for FeedMatch {
    fn from(item: &FeedItem) -> Self {
        Self {
            title: item.title.clone(),
            category: item.category.clone(),
            severity: item.severity,
            source: item.source.clone(),
            date: item.date.clone(),
        }
    }
}

/// Domain reputation level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatLevel {
    /// No feed mentions the domain
    Clean,
    /// One or two non-critical mentions
    Medium,
    /// More than two non-critical mentions
    High,
    /// At least one critical mention
    Critical,
    /// Feeds could not be consulted
    Unknown,
}

/// Domain reputation derived from current feeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainReputation {
    /// Queried domain
    pub domain: String,
    /// Score (0-100)
    pub threat_score: u8,
    /// Level
    pub threat_level: ThreatLevel,
    /// Number of matching feed items
    pub match_count: usize,
    /// First five matches
    pub matches: Vec<FeedMatch>,
    /// No feed mentions the domain
    pub is_clean: bool,
    /// Set when feeds could not be consulted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
