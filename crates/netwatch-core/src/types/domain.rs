use serde::{Deserialize, Serialize};

use super::{known, UNKNOWN};

/// Registration data supplied by one WHOIS-style provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisFragment {
    /// Sponsoring registrar
    pub registrar: Option<String>,

    /// Registration date
    pub created: Option<String>,

    /// Expiration date
    pub expires: Option<String>,

    /// Last update date
    pub updated: Option<String>,

    /// EPP status codes, in the order the provider returned them
    pub status: Vec<String>,

    /// Delegated name servers, in the order the provider returned them
    pub name_servers: Vec<String>,

    /// Registrant organization
    pub registrant_org: Option<String>,

    /// Registrant country
    pub registrant_country: Option<String>,

    /// DNSSEC state ("Signed", "Unsigned", "Validated", ...)
    pub dnssec: Option<String>,
}

/// Normalized domain registration record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    /// Queried domain
    pub domain: String,

    /// Sponsoring registrar
    pub registrar: String,

    /// Registration date or "Unknown"
    pub created_date: String,

    /// Expiration date or "Unknown"
    pub expiry_date: String,

    /// Last update date or "Unknown"
    pub updated_date: String,

    /// EPP status codes
    pub status: Vec<String>,

    /// Name servers
    pub name_servers: Vec<String>,

    /// Registrant organization
    pub registrant_org: String,

    /// Registrant country
    pub registrant_country: String,

    /// DNSSEC state
    pub dnssec: String,

    /// Elapsed time since registration ("12y 4m") or "Unknown"
    pub domain_age: String,

    /// Provider that supplied the data
    pub source: String,

    /// Present only when every provider failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DomainRecord {
    /// Normalize a provider fragment, filling every gap with "Unknown".
    ///
    /// `domain_age` is derived separately and passed in.
    #[must_use]
    pub fn from_fragment(
        domain: &str,
        fragment: WhoisFragment,
        source: &str,
        domain_age: String,
    ) -> Self {
        let text = |value: Option<&String>| {
            known(value.map(String::as_str)).unwrap_or(UNKNOWN).to_string()
        };

        Self {
            domain: domain.to_string(),
            registrar: text(fragment.registrar.as_ref()),
            created_date: text(fragment.created.as_ref()),
            expiry_date: text(fragment.expires.as_ref()),
            updated_date: text(fragment.updated.as_ref()),
            status: fragment.status,
            name_servers: fragment.name_servers,
            registrant_org: text(fragment.registrant_org.as_ref()),
            registrant_country: text(fragment.registrant_country.as_ref()),
            dnssec: text(fragment.dnssec.as_ref()),
            domain_age,
            source: source.to_string(),
            error: None,
        }
    }

    /// Terminal record returned when no provider answered
    #[must_use]
    pub fn unavailable(domain: &str) -> Self {
        const UNAVAILABLE: &str = "Unavailable";
        Self {
            domain: domain.to_string(),
            registrar: UNAVAILABLE.to_string(),
            created_date: UNAVAILABLE.to_string(),
            expiry_date: UNAVAILABLE.to_string(),
            updated_date: UNAVAILABLE.to_string(),
            status: Vec::new(),
            name_servers: Vec::new(),
            registrant_org: UNAVAILABLE.to_string(),
            registrant_country: UNAVAILABLE.to_string(),
            dnssec: UNKNOWN.to_string(),
            domain_age: UNKNOWN.to_string(),
            source: "Error: No data available".to_string(),
            error: Some("All WHOIS sources unavailable".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_fragment_gets_defaults() {
        let fragment = WhoisFragment {
            registrar: Some("MarkMonitor Inc.".into()),
            created: Some("  ".into()),
            name_servers: vec!["ns1.google.com".into()],
            ..WhoisFragment::default()
        };

        let record =
            DomainRecord::from_fragment("google.com", fragment, "rdap.org", "Unknown".into());
        assert_eq!(record.registrar, "MarkMonitor Inc.");
        assert_eq!(record.created_date, UNKNOWN);
        assert_eq!(record.expiry_date, UNKNOWN);
        assert_eq!(record.registrant_org, UNKNOWN);
        assert_eq!(record.dnssec, UNKNOWN);
        assert_eq!(record.name_servers, vec!["ns1.google.com"]);
        assert!(record.status.is_empty());
        assert!(record.error.is_none());

        let json = serde_json::to_value(&record).unwrap();
        for key in [
            "domain",
            "registrar",
            "createdDate",
            "expiryDate",
            "updatedDate",
            "status",
            "nameServers",
            "registrantOrg",
            "registrantCountry",
            "dnssec",
            "domainAge",
            "source",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json.get("error").is_none());
    }

    #[test]
    fn unavailable_record_carries_error() {
        let record = DomainRecord::unavailable("example.org");
        assert_eq!(record.error.as_deref(), Some("All WHOIS sources unavailable"));
        assert_eq!(record.registrar, "Unavailable");
        assert!(record.name_servers.is_empty());
    }
}
