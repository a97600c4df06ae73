//! Provider configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything the adapters need: endpoints, credentials and timeouts.
///
/// Built once at startup and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider base URLs
    pub endpoints: Endpoints,

    /// Provider credentials
    pub keys: ApiKeys,

    /// Per-call timeouts
    pub timeouts: Timeouts,

    /// User-Agent sent with every request
    pub user_agent: String,

    /// ip-api.com requests allowed per minute
    pub ip_api_per_minute: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            keys: ApiKeys::default(),
            timeouts: Timeouts::default(),
            user_agent: format!("netwatch/{}", env!("CARGO_PKG_VERSION")),
            ip_api_per_minute: 45,
        }
    }
}

/// Base URL for each provider (overridable for testing)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub ip_api: String,
    pub ipapi_co: String,
    pub ipwhois: String,
    pub abuseipdb: String,
    pub who_dat: String,
    pub rdap: String,
    pub whoisfreaks: String,
    pub google_dns: String,
    pub malwarebazaar: String,
    pub threatfox: String,
    pub urlhaus: String,
    pub alienvault: String,
    pub phishtank: String,
    pub google_news: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            ip_api: "http://ip-api.com".to_string(),
            ipapi_co: "https://ipapi.co".to_string(),
            ipwhois: "https://ipwhois.app".to_string(),
            abuseipdb: "https://api.abuseipdb.com".to_string(),
            who_dat: "https://who-dat.as93.net".to_string(),
            rdap: "https://rdap.org".to_string(),
            whoisfreaks: "https://api.whoisfreaks.com".to_string(),
            google_dns: "https://dns.google".to_string(),
            malwarebazaar: "https://mb-api.abuse.ch".to_string(),
            threatfox: "https://threatfox-api.abuse.ch".to_string(),
            urlhaus: "https://urlhaus-api.abuse.ch".to_string(),
            alienvault: "https://otx.alienvault.com".to_string(),
            phishtank: "http://data.phishtank.com".to_string(),
            google_news: "https://news.google.com".to_string(),
        }
    }
}

/// Provider credentials. A missing key disables the provider without a
/// network call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    /// AbuseIPDB `Key` header
    pub abuseipdb: Option<String>,

    /// AlienVault OTX `X-OTX-API-KEY` header
    pub alienvault: Option<String>,

    /// abuse.ch `Auth-Key` header (optional for all abuse.ch services)
    pub abusech: Option<String>,

    /// WhoisFreaks `apiKey` parameter (optional)
    pub whoisfreaks: Option<String>,
}

impl ApiKeys {
    /// Treat blank strings as absent
    #[must_use]
    pub fn present(key: Option<&String>) -> Option<&str> {
        key.map(|k| k.trim()).filter(|k| !k.is_empty())
    }
}

/// Timeouts in seconds for each provider family
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub geo_secs: u64,
    pub reputation_secs: u64,
    pub whois_secs: u64,
    pub dns_secs: u64,
    pub hash_secs: u64,
    pub feed_secs: u64,
    pub news_secs: u64,
    pub tls_secs: u64,
    pub latency_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            geo_secs: 5,
            reputation_secs: 8,
            whois_secs: 8,
            dns_secs: 5,
            hash_secs: 8,
            feed_secs: 10,
            news_secs: 10,
            tls_secs: 5,
            latency_secs: 10,
        }
    }
}

impl Timeouts {
    #[must_use]
    pub const fn geo(&self) -> Duration {
        Duration::from_secs(self.geo_secs)
    }

    #[must_use]
    pub const fn reputation(&self) -> Duration {
        Duration::from_secs(self.reputation_secs)
    }

    #[must_use]
    pub const fn whois(&self) -> Duration {
        Duration::from_secs(self.whois_secs)
    }

    #[must_use]
    pub const fn dns(&self) -> Duration {
        Duration::from_secs(self.dns_secs)
    }

    #[must_use]
    pub const fn hash(&self) -> Duration {
        Duration::from_secs(self.hash_secs)
    }

    #[must_use]
    pub const fn feed(&self) -> Duration {
        Duration::from_secs(self.feed_secs)
    }

    #[must_use]
    pub const fn news(&self) -> Duration {
        Duration::from_secs(self.news_secs)
    }

    #[must_use]
    pub const fn tls(&self) -> Duration {
        Duration::from_secs(self.tls_secs)
    }

    #[must_use]
    pub const fn latency(&self) -> Duration {
        Duration::from_secs(self.latency_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProviderConfig::default();
        assert_eq!(config.timeouts.geo(), Duration::from_secs(5));
        assert_eq!(config.timeouts.hash(), Duration::from_secs(8));
        assert_eq!(config.timeouts.latency(), Duration::from_secs(10));
        assert_eq!(config.endpoints.rdap, "https://rdap.org");
        assert_eq!(config.ip_api_per_minute, 45);
        assert!(config.keys.abuseipdb.is_none());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let parsed: ProviderConfig =
            serde_json::from_str(r#"{"keys": {"abuseipdb": "k"}, "timeouts": {"geo_secs": 2}}"#)
                .unwrap();
        assert_eq!(parsed.keys.abuseipdb.as_deref(), Some("k"));
        assert_eq!(parsed.timeouts.geo_secs, 2);
        assert_eq!(parsed.timeouts.whois_secs, 8);
        assert_eq!(parsed.endpoints.ip_api, "http://ip-api.com");
    }

    #[test]
    fn test_blank_key_is_absent() {
        assert_eq!(ApiKeys::present(Some(&"  ".to_string())), None);
        assert_eq!(ApiKeys::present(Some(&"abc".to_string())), Some("abc"));
        assert_eq!(ApiKeys::present(None), None);
    }
}
