use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Geolocation data supplied by one provider.
///
/// Every field a provider may omit is an `Option`; adapters never fill in
/// guesses.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFragment {
    /// City name
    pub city: Option<String>,

    /// Country name
    pub country: Option<String>,

    /// Latitude coordinate
    pub latitude: Option<f64>,

    /// Longitude coordinate
    pub longitude: Option<f64>,

    /// Internet service provider
    pub isp: Option<String>,

    /// Owning organization
    pub org: Option<String>,

    /// Autonomous system label (e.g. "AS15169 Google LLC")
    pub asn: Option<String>,

    /// Provider that answered
    pub source: &'static str,
}

impl GeoFragment {
    /// Create an empty fragment attributed to `source`
    #[must_use]
    pub const fn empty(source: &'static str) -> Self {
        Self {
            city: None,
            country: None,
            latitude: None,
            longitude: None,
            isp: None,
            org: None,
            asn: None,
            source,
        }
    }

    /// Returns the coordinates as a tuple if both are available
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Abuse reputation for an IP address.
///
/// Unknowns stay `None` here; [`ReputationReport`] and the merged
/// [`IpRecord`] resolve them to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationFragment {
    /// Abuse confidence (0-100)
    pub abuse_confidence_score: Option<u8>,

    /// Number of abuse reports in the lookback window
    pub total_reports: Option<u32>,

    /// Timestamp of the most recent report
    pub last_reported_at: Option<String>,

    /// Address is a Tor exit node
    pub is_tor: Option<bool>,

    /// Address is publicly routable
    pub is_public: Option<bool>,

    /// Usage classification (e.g. "Data Center/Web Hosting/Transit")
    pub usage_type: Option<String>,

    /// ISP as known to the reputation provider
    pub isp: Option<String>,

    /// Two-letter country code
    pub country_code: Option<String>,

    /// Reverse-resolved domain
    pub domain: Option<String>,

    /// Provenance, or the reason no reputation data is present
    pub source: String,

    /// Set when the provider call failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReputationFragment {
    /// Fragment used when no reputation provider has credentials
    #[must_use]
    pub fn not_configured(provider: &str) -> Self {
        Self {
            source: format!("No {provider} API key configured"),
            ..Self::default()
        }
    }

    /// Fragment used when the reputation provider failed
    #[must_use]
    pub fn unavailable(provider: &str) -> Self {
        Self {
            source: format!("{provider} unavailable"),
            error: Some("Reputation check failed".to_string()),
            ..Self::default()
        }
    }
}

/// Body of the standalone reputation endpoint.
///
/// Same fields as [`ReputationFragment`], with the unknowns resolved to the
/// defaults the merged IP record uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationReport {
    /// Queried address
    pub ip: Ipv4Addr,

    /// Abuse confidence (0-100, 0 when unknown)
    pub abuse_confidence_score: u8,

    /// Abuse reports in the lookback window (0 when unknown)
    pub total_reports: u32,

    /// Timestamp of the most recent report
    pub last_reported_at: Option<String>,

    /// Tor exit node flag (false when unknown)
    pub is_tor: bool,

    /// Publicly routable flag (true when unknown)
    pub is_public: bool,

    pub usage_type: Option<String>,
    pub isp: Option<String>,
    pub country_code: Option<String>,
    pub domain: Option<String>,

    /// Provenance, or the reason no reputation data is present
    pub source: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReputationReport {
    /// Resolve a fragment for `ip` into a report
    #[must_use]
    pub fn new(ip: Ipv4Addr, fragment: ReputationFragment) -> Self {
        Self {
            ip,
            abuse_confidence_score: fragment.abuse_confidence_score.unwrap_or(0).min(100),
            total_reports: fragment.total_reports.unwrap_or(0),
            last_reported_at: fragment.last_reported_at,
            is_tor: fragment.is_tor.unwrap_or(false),
            is_public: fragment.is_public.unwrap_or(true),
            usage_type: fragment.usage_type,
            isp: fragment.isp,
            country_code: fragment.country_code,
            domain: fragment.domain,
            source: fragment.source,
            error: fragment.error,
        }
    }
}

/// Normalized IP lookup result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpRecord {
    /// Queried address
    pub ip: Ipv4Addr,

    /// "City, Country" or "Unknown Location"
    pub location: String,

    /// ISP name or "Unknown ISP"
    pub isp: String,

    /// Autonomous system label or "N/A"
    pub asn: String,

    /// "lat, lon" or "0, 0"
    pub coordinates: String,

    /// Latitude (0 when unknown)
    pub lat: f64,

    /// Longitude (0 when unknown)
    pub lng: f64,

    /// Abuse confidence (0-100)
    pub abuse_score: u8,

    /// Total abuse reports
    pub total_reports: u32,

    /// Most recent abuse report
    pub last_reported: Option<String>,

    /// Tor exit node flag
    pub is_tor: bool,

    /// Publicly routable flag
    pub is_public: bool,

    /// Derived risk score (0-100)
    pub score: u8,

    /// Synthesized labels, never containing blanks or "Unknown"
    pub tags: Vec<String>,

    /// Provider that supplied geolocation
    pub source: String,

    /// Provider that supplied reputation
    pub reputation_source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reputation_fallbacks_carry_reason() {
        let none = ReputationFragment::not_configured("AbuseIPDB");
        assert_eq!(none.source, "No AbuseIPDB API key configured");
        assert!(none.error.is_none());

        let down = ReputationFragment::unavailable("AbuseIPDB");
        assert_eq!(down.source, "AbuseIPDB unavailable");
        assert_eq!(down.error.as_deref(), Some("Reputation check failed"));
    }

    #[test]
    fn report_fills_unknowns_and_keeps_address() {
        let ip = Ipv4Addr::new(8, 8, 8, 8);
        let report = ReputationReport::new(ip, ReputationFragment::unavailable("AbuseIPDB"));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["ip"], "8.8.8.8");
        assert_eq!(json["abuseConfidenceScore"], 0);
        assert_eq!(json["totalReports"], 0);
        assert_eq!(json["isTor"], false);
        assert_eq!(json["isPublic"], true);
        assert_eq!(json["source"], "AbuseIPDB unavailable");
        assert_eq!(json["error"], "Reputation check failed");
    }

    #[test]
    fn report_keeps_provider_values() {
        let fragment = ReputationFragment {
            abuse_confidence_score: Some(87),
            total_reports: Some(412),
            is_tor: Some(true),
            is_public: Some(true),
            isp: Some("Hetzner Online GmbH".into()),
            source: "AbuseIPDB".into(),
            ..ReputationFragment::default()
        };
        let report = ReputationReport::new(Ipv4Addr::new(185, 220, 101, 1), fragment);
        assert_eq!(report.abuse_confidence_score, 87);
        assert_eq!(report.total_reports, 412);
        assert!(report.is_tor);
        assert_eq!(report.isp.as_deref(), Some("Hetzner Online GmbH"));
        assert!(report.error.is_none());
    }

    #[test]
    fn coordinates_require_both_axes() {
        let mut geo = GeoFragment::empty("ip-api.com");
        geo.latitude = Some(1.5);
        assert_eq!(geo.coordinates(), None);
        geo.longitude = Some(2.5);
        assert_eq!(geo.coordinates(), Some((1.5, 2.5)));
    }
}
