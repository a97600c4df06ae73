//! abuse.ch malware databases: MalwareBazaar, ThreatFox and URLhaus.
//!
//! All three answer with a `query_status` discriminator. The documented
//! "no match" value maps to `NotFound`, `ok` with data maps to a hit, and
//! anything else is a malformed response.

use async_trait::async_trait;
use netwatch_core::{HashKind, HashMatch, SourceAdapter, SourceError, SourceResult};
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::instrument;

use super::present;
use crate::config::{ApiKeys, ProviderConfig};
use crate::transport::{endpoint, HttpTransport};

const MALWAREBAZAAR_SCORE: u8 = 85;
const THREATFOX_SCORE: u8 = 80;
const URLHAUS_SCORE: u8 = 75;

/// Shared plumbing for the abuse.ch APIs
struct AbuseCh {
    transport: HttpTransport,
    base_url: String,
    auth_key: Option<String>,
    timeout: Duration,
}

impl AbuseCh {
    fn new(transport: HttpTransport, base_url: &str, config: &ProviderConfig) -> Self {
        Self {
            transport,
            base_url: base_url.to_string(),
            auth_key: ApiKeys::present(config.keys.abusech.as_ref()).map(String::from),
            timeout: config.timeouts.hash(),
        }
    }

    fn post(&self, provider: &'static str, segments: &[&str]) -> SourceResult<RequestBuilder> {
        let url = endpoint(provider, &self.base_url, segments)?;
        let request = self.transport.post(url);
        Ok(match self.auth_key.as_deref() {
            Some(key) => request.header("Auth-Key", key),
            None => request,
        })
    }
}

fn unexpected(provider: &'static str, status: &str) -> SourceError {
    SourceError::malformed(provider, format!("unexpected query_status {status:?}"))
}

/// MalwareBazaar sample database
pub struct MalwareBazaar(AbuseCh);

impl MalwareBazaar {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self(AbuseCh::new(transport, &config.endpoints.malwarebazaar, config))
    }
}

#[derive(Debug, Deserialize)]
struct BazaarResponse {
    query_status: String,
    #[serde(default)]
    data: Vec<BazaarSample>,
}

#[derive(Debug, Deserialize)]
struct BazaarSample {
    signature: Option<String>,
    tags: Option<Vec<String>>,
}

#[async_trait]
impl SourceAdapter<str> for MalwareBazaar {
    type Fragment = HashMatch;

    fn name(&self) -> &'static str {
        "MalwareBazaar"
    }

    #[instrument(skip(self), fields(provider = "MalwareBazaar"))]
    async fn fetch(&self, hash: &str) -> SourceResult<HashMatch> {
        let request = self
            .0
            .post(self.name(), &["api", "v1", ""])?
            .form(&[("query", "get_info"), ("hash", hash)]);
        let body: BazaarResponse = self.0.transport.json(self.name(), request, self.0.timeout).await?;

        match body.query_status.as_str() {
            "hash_not_found" => Err(SourceError::NotFound {
                provider: self.name(),
            }),
            "ok" => {
                let sample = body
                    .data
                    .into_iter()
                    .next()
                    .ok_or_else(|| SourceError::malformed(self.name(), "ok without samples"))?;
                let family = present(sample.signature);
                Ok(HashMatch {
                    result: family.clone().unwrap_or_else(|| "Malware".to_string()),
                    family,
                    score: MALWAREBAZAAR_SCORE,
                    tags: sample
                        .tags
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| vec!["malware".to_string()]),
                })
            }
            other => Err(unexpected(self.name(), other)),
        }
    }
}

/// ThreatFox IOC database
pub struct ThreatFox(AbuseCh);

impl ThreatFox {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self(AbuseCh::new(transport, &config.endpoints.threatfox, config))
    }
}

#[derive(Debug, Deserialize)]
struct ThreatFoxResponse {
    query_status: String,
    // A message string instead of a list when nothing matched
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct ThreatFoxIoc {
    malware: Option<String>,
    malware_printable: Option<String>,
    threat_type: Option<String>,
}

#[async_trait]
impl SourceAdapter<str> for ThreatFox {
    type Fragment = HashMatch;

    fn name(&self) -> &'static str {
        "ThreatFox"
    }

    #[instrument(skip(self), fields(provider = "ThreatFox"))]
    async fn fetch(&self, hash: &str) -> SourceResult<HashMatch> {
        let request = self
            .0
            .post(self.name(), &["api", "v1", ""])?
            .json(&json!({ "query": "search_hash", "hash": hash }));
        let body: ThreatFoxResponse =
            self.0.transport.json(self.name(), request, self.0.timeout).await?;

        match body.query_status.as_str() {
            "no_result" => Err(SourceError::NotFound {
                provider: self.name(),
            }),
            "ok" => {
                let iocs: Vec<ThreatFoxIoc> = serde_json::from_value(body.data)
                    .map_err(|e| SourceError::malformed(self.name(), e.to_string()))?;
                let ioc = iocs
                    .into_iter()
                    .next()
                    .ok_or_else(|| SourceError::malformed(self.name(), "ok without IOCs"))?;
                let printable = present(ioc.malware_printable);
                Ok(HashMatch {
                    family: present(ioc.malware).or_else(|| printable.clone()),
                    score: THREATFOX_SCORE,
                    result: printable.clone().unwrap_or_else(|| "IOC".to_string()),
                    tags: vec![
                        present(ioc.threat_type).unwrap_or_else(|| "threat".to_string()),
                        printable.unwrap_or_else(|| "malware".to_string()),
                    ],
                })
            }
            other => Err(unexpected(self.name(), other)),
        }
    }
}

/// URLhaus payload database.
///
/// URLhaus indexes payloads by MD5 and SHA-256 only; a SHA-1 query is
/// reported as `Unavailable` without a request.
pub struct UrlhausPayload(AbuseCh);

impl UrlhausPayload {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self(AbuseCh::new(transport, &config.endpoints.urlhaus, config))
    }
}

#[derive(Debug, Deserialize)]
struct PayloadResponse {
    query_status: String,
    signature: Option<String>,
    file_type: Option<String>,
}

#[async_trait]
impl SourceAdapter<str> for UrlhausPayload {
    type Fragment = HashMatch;

    fn name(&self) -> &'static str {
        "URLhaus"
    }

    #[instrument(skip(self), fields(provider = "URLhaus"))]
    async fn fetch(&self, hash: &str) -> SourceResult<HashMatch> {
        let field = match HashKind::detect(hash) {
            Some(HashKind::Md5) => "md5_hash",
            Some(HashKind::Sha256) => "sha256_hash",
            Some(HashKind::Sha1) | None => {
                return Err(SourceError::unavailable(
                    self.name(),
                    "only MD5 and SHA-256 are indexed",
                ))
            }
        };

        let request = self
            .0
            .post(self.name(), &["v1", "payload", ""])?
            .form(&[(field, hash)]);
        let body: PayloadResponse =
            self.0.transport.json(self.name(), request, self.0.timeout).await?;

        match body.query_status.as_str() {
            "no_results" => Err(SourceError::NotFound {
                provider: self.name(),
            }),
            "ok" => {
                let file_type = present(body.file_type);
                Ok(HashMatch {
                    family: Some(
                        present(body.signature).unwrap_or_else(|| "Malicious Payload".to_string()),
                    ),
                    score: URLHAUS_SCORE,
                    result: file_type.clone().unwrap_or_else(|| "payload".to_string()),
                    tags: vec![
                        file_type.unwrap_or_else(|| "executable".to_string()),
                        "urlhaus".to_string(),
                    ],
                })
            }
            other => Err(unexpected(self.name(), other)),
        }
    }
}
