//! Threat feed providers.

use async_trait::async_trait;
use netwatch_core::time::date_part;
use netwatch_core::{FeedItem, Severity, SourceAdapter, SourceError, SourceResult, UNKNOWN};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::instrument;

use super::{present, text};
use crate::config::{ApiKeys, ProviderConfig};
use crate::transport::{endpoint, HttpTransport};

const URLHAUS_LIMIT: usize = 8;
const ALIENVAULT_LIMIT: usize = 10;
const ALIENVAULT_IOC_LIMIT: usize = 5;
const PHISHTANK_LIMIT: usize = 20;

/// PhishTank asks feed consumers to identify themselves
const PHISHTANK_USER_AGENT: &str = "phishtank/netwatch-threat-intel";

/// URLhaus recently added malware URLs
pub struct UrlhausRecent {
    transport: HttpTransport,
    base_url: String,
    timeout: Duration,
}

impl UrlhausRecent {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self {
            transport,
            base_url: config.endpoints.urlhaus.clone(),
            timeout: config.timeouts.feed(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecentResponse {
    query_status: String,
    #[serde(default)]
    urls: Vec<RecentUrl>,
}

#[derive(Debug, Deserialize)]
struct RecentUrl {
    #[serde(default)]
    id: Value,
    url: String,
    url_status: Option<String>,
    date_added: Option<String>,
    threat: Option<String>,
    reporter: Option<String>,
    tags: Option<Vec<String>>,
}

impl From<RecentUrl> for FeedItem {
    fn from(entry: RecentUrl) -> Self {
        let severity = if entry.threat.as_deref() == Some("malware_download") {
            Severity::Critical
        } else {
            Severity::High
        };

        Self {
            id: text(&entry.id).unwrap_or_default(),
            title: format!(
                "Malicious URL Detected: {}",
                present(entry.url_status).unwrap_or_else(|| "unknown".to_string())
            ),
            category: "Malware".to_string(),
            date: present(entry.date_added).unwrap_or_else(|| UNKNOWN.to_string()),
            severity,
            description: format!(
                "URL: {} | Reporter: {}",
                entry.url,
                present(entry.reporter).unwrap_or_else(|| "anonymous".to_string())
            ),
            tags: entry
                .tags
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| vec!["urlhaus".to_string(), "malware".to_string()]),
            source: "URLHaus".to_string(),
            iocs: Some(vec![entry.url]),
        }
    }
}

#[async_trait]
impl SourceAdapter<()> for UrlhausRecent {
    type Fragment = Vec<FeedItem>;

    fn name(&self) -> &'static str {
        "URLHaus"
    }

    #[instrument(skip(self, _query), fields(provider = "URLHaus"))]
    async fn fetch(&self, _query: &()) -> SourceResult<Vec<FeedItem>> {
        let url = endpoint(self.name(), &self.base_url, &["v1", "urls", "recent", ""])?;
        let body: RecentResponse = self
            .transport
            .json(self.name(), self.transport.get(url), self.timeout)
            .await?;

        if body.query_status != "ok" {
            return Err(SourceError::malformed(
                self.name(),
                format!("unexpected query_status {:?}", body.query_status),
            ));
        }

        Ok(body
            .urls
            .into_iter()
            .take(URLHAUS_LIMIT)
            .map(FeedItem::from)
            .collect())
    }
}

/// AlienVault OTX subscribed pulses. Requires an API key.
pub struct AlienVault {
    transport: HttpTransport,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl AlienVault {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self {
            transport,
            base_url: config.endpoints.alienvault.clone(),
            api_key: ApiKeys::present(config.keys.alienvault.as_ref()).map(String::from),
            timeout: config.timeouts.feed(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PulsePage {
    results: Vec<Pulse>,
}

#[derive(Debug, Deserialize)]
struct Pulse {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    created: String,
    #[serde(default)]
    adversary: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    indicators: Vec<PulseIndicator>,
}

#[derive(Debug, Deserialize)]
struct PulseIndicator {
    indicator: String,
}

impl From<Pulse> for FeedItem {
    fn from(pulse: Pulse) -> Self {
        let severity = if present(pulse.adversary).is_some() {
            Severity::Critical
        } else {
            Severity::High
        };

        Self {
            id: pulse.id,
            title: pulse.name,
            category: pulse
                .tags
                .first()
                .cloned()
                .unwrap_or_else(|| "Threat".to_string()),
            date: date_part(&pulse.created),
            severity,
            description: present(pulse.description)
                .unwrap_or_else(|| "No description available".to_string()),
            tags: pulse.tags,
            source: "AlienVault OTX".to_string(),
            iocs: Some(
                pulse
                    .indicators
                    .into_iter()
                    .take(ALIENVAULT_IOC_LIMIT)
                    .map(|i| i.indicator)
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl SourceAdapter<()> for AlienVault {
    type Fragment = Vec<FeedItem>;

    fn name(&self) -> &'static str {
        "AlienVault OTX"
    }

    #[instrument(skip(self, _query), fields(provider = "AlienVault OTX"))]
    async fn fetch(&self, _query: &()) -> SourceResult<Vec<FeedItem>> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(SourceError::NotConfigured {
                provider: self.name(),
            });
        };

        let url = endpoint(self.name(), &self.base_url, &["api", "v1", "pulses", "subscribed"])?;
        let request = self.transport.get(url).header("X-OTX-API-KEY", key);
        let page: PulsePage = self.transport.json(self.name(), request, self.timeout).await?;

        Ok(page
            .results
            .into_iter()
            .take(ALIENVAULT_LIMIT)
            .map(FeedItem::from)
            .collect())
    }
}

/// PhishTank verified, online phishing URLs
pub struct PhishTank {
    transport: HttpTransport,
    base_url: String,
    timeout: Duration,
}

impl PhishTank {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self {
            transport,
            base_url: config.endpoints.phishtank.clone(),
            timeout: config.timeouts.feed(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PhishEntry {
    #[serde(default)]
    phish_id: Value,
    url: String,
    submission_time: Option<String>,
    verified: Option<String>,
    target: Option<String>,
}

impl From<PhishEntry> for FeedItem {
    fn from(entry: PhishEntry) -> Self {
        let target = present(entry.target);
        let severity = if entry.verified.as_deref() == Some("yes") {
            Severity::Critical
        } else {
            Severity::High
        };

        Self {
            id: format!("phishtank-{}", text(&entry.phish_id).unwrap_or_default()),
            title: format!(
                "Phishing Site Detected: {}",
                target.as_deref().unwrap_or("Unknown Target")
            ),
            category: "Phishing".to_string(),
            date: present(entry.submission_time)
                .map_or_else(|| UNKNOWN.to_string(), |t| date_part(&t)),
            severity,
            description: format!(
                "Verified phishing URL targeting {}. URL: {}",
                target.as_deref().unwrap_or("users"),
                entry.url
            ),
            tags: vec![
                "phishing".to_string(),
                target.map_or_else(|| "generic".to_string(), |t| t.to_lowercase()),
                "phishtank".to_string(),
            ],
            source: "PhishTank".to_string(),
            iocs: Some(vec![entry.url]),
        }
    }
}

#[async_trait]
impl SourceAdapter<()> for PhishTank {
    type Fragment = Vec<FeedItem>;

    fn name(&self) -> &'static str {
        "PhishTank"
    }

    #[instrument(skip(self, _query), fields(provider = "PhishTank"))]
    async fn fetch(&self, _query: &()) -> SourceResult<Vec<FeedItem>> {
        let url = endpoint(self.name(), &self.base_url, &["data", "online-valid.json"])?;
        let request = self
            .transport
            .get(url)
            .header(reqwest::header::USER_AGENT, PHISHTANK_USER_AGENT);
        let entries: Vec<PhishEntry> = self.transport.json(self.name(), request, self.timeout).await?;

        Ok(entries
            .into_iter()
            .take(PHISHTANK_LIMIT)
            .map(FeedItem::from)
            .collect())
    }
}
