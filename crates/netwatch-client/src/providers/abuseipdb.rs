//! AbuseIPDB reputation provider.

use async_trait::async_trait;
use netwatch_core::{ReputationFragment, SourceAdapter, SourceError, SourceResult};
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::instrument;

use super::present;
use crate::config::{ApiKeys, ProviderConfig};
use crate::transport::{endpoint, HttpTransport};

/// Reports older than this are ignored
const MAX_AGE_DAYS: u32 = 90;

/// AbuseIPDB `check` endpoint.
///
/// Without an API key every fetch returns `NotConfigured` and no request is
/// made.
pub struct AbuseIpDb {
    transport: HttpTransport,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl AbuseIpDb {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self {
            transport,
            base_url: config.endpoints.abuseipdb.clone(),
            api_key: ApiKeys::present(config.keys.abuseipdb.as_ref()).map(String::from),
            timeout: config.timeouts.reputation(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    data: CheckData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckData {
    abuse_confidence_score: Option<u8>,
    total_reports: Option<u32>,
    last_reported_at: Option<String>,
    is_tor: Option<bool>,
    is_public: Option<bool>,
    usage_type: Option<String>,
    isp: Option<String>,
    country_code: Option<String>,
    domain: Option<String>,
}

#[async_trait]
impl SourceAdapter<Ipv4Addr> for AbuseIpDb {
    type Fragment = ReputationFragment;

    fn name(&self) -> &'static str {
        "AbuseIPDB"
    }

    #[instrument(skip(self), fields(provider = "AbuseIPDB"))]
    async fn fetch(&self, ip: &Ipv4Addr) -> SourceResult<ReputationFragment> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(SourceError::NotConfigured {
                provider: self.name(),
            });
        };

        let mut url = endpoint(self.name(), &self.base_url, &["api", "v2", "check"])?;
        url.set_query(Some(&format!(
            "ipAddress={ip}&maxAgeInDays={MAX_AGE_DAYS}&verbose"
        )));

        let request = self
            .transport
            .get(url)
            .header("Key", key)
            .header("Accept", "application/json");
        let body: CheckResponse = self.transport.json(self.name(), request, self.timeout).await?;
        let data = body.data;

        Ok(ReputationFragment {
            abuse_confidence_score: data.abuse_confidence_score.map(|s| s.min(100)),
            total_reports: data.total_reports,
            last_reported_at: present(data.last_reported_at),
            is_tor: data.is_tor,
            is_public: data.is_public,
            usage_type: present(data.usage_type),
            isp: present(data.isp),
            country_code: present(data.country_code),
            domain: present(data.domain),
            source: self.name().to_string(),
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer, key: Option<&str>) -> AbuseIpDb {
        let mut config = ProviderConfig::default();
        config.endpoints.abuseipdb = server.uri();
        config.keys.abuseipdb = key.map(String::from);
        AbuseIpDb::new(HttpTransport::new("netwatch-test").unwrap(), &config)
    }

    #[tokio::test]
    async fn missing_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = adapter(&server, None)
            .fetch(&Ipv4Addr::new(1, 2, 3, 4))
            .await
            .unwrap_err();
        assert_eq!(err, SourceError::NotConfigured { provider: "AbuseIPDB" });

        let blank = adapter(&server, Some(" ")).fetch(&Ipv4Addr::new(1, 2, 3, 4)).await;
        assert!(matches!(blank, Err(SourceError::NotConfigured { .. })));
    }

    #[tokio::test]
    async fn parses_check_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/check"))
            .and(query_param("ipAddress", "185.220.101.1"))
            .and(query_param("maxAgeInDays", "90"))
            .and(header("Key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "ipAddress": "185.220.101.1",
                    "isPublic": true,
                    "abuseConfidenceScore": 100,
                    "countryCode": "DE",
                    "usageType": "Data Center/Web Hosting/Transit",
                    "isp": "Zwiebelfreunde e.V.",
                    "domain": "torproject.org",
                    "isTor": true,
                    "totalReports": 1432,
                    "lastReportedAt": "2024-06-01T10:00:00+00:00"
                }
            })))
            .mount(&server)
            .await;

        let rep = adapter(&server, Some("secret"))
            .fetch(&Ipv4Addr::new(185, 220, 101, 1))
            .await
            .unwrap();
        assert_eq!(rep.abuse_confidence_score, Some(100));
        assert_eq!(rep.total_reports, Some(1432));
        assert_eq!(rep.is_tor, Some(true));
        assert_eq!(rep.usage_type.as_deref(), Some("Data Center/Web Hosting/Transit"));
        assert_eq!(rep.source, "AbuseIPDB");
        assert!(rep.error.is_none());
    }

    #[tokio::test]
    async fn unauthorized_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = adapter(&server, Some("bad"))
            .fetch(&Ipv4Addr::new(1, 2, 3, 4))
            .await
            .unwrap_err();
        assert_eq!(err, SourceError::unavailable("AbuseIPDB", "HTTP 401"));
    }
}
