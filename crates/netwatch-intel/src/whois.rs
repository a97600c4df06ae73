//! Domain registration lookups.

use chrono::Utc;
use netwatch_core::{DomainRecord, IntelError, Result, WhoisAdapter};
use tracing::{instrument, warn};

use crate::merge::normalize_whois;
use crate::sequencer::first_success;

/// Ordered WHOIS chain ending in a DNS-only fallback
pub struct WhoisLookup {
    chain: Vec<Box<WhoisAdapter>>,
}

impl WhoisLookup {
    pub fn new(chain: Vec<Box<WhoisAdapter>>) -> Self {
        Self { chain }
    }

    /// Registration record for `domain`.
    ///
    /// Never fails once the input is usable: when every source is down the
    /// record carries an `error` field instead.
    #[instrument(skip(self))]
    pub async fn lookup(&self, domain: &str) -> Result<DomainRecord> {
        let domain = clean_domain(domain)?;

        match first_success(&self.chain, domain.as_str()).await {
            Ok(whois) => Ok(normalize_whois(&domain, whois, Utc::now())),
            Err(e) => {
                warn!(domain = %domain, error = %e, "no WHOIS source answered");
                Ok(DomainRecord::unavailable(&domain))
            }
        }
    }
}

/// Strip scheme, `www.` and any path, then lowercase
pub(crate) fn clean_domain(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
        .unwrap_or(raw);
    let raw = raw.strip_prefix("www.").unwrap_or(raw);
    let host = raw.split('/').next().unwrap_or_default().to_lowercase();

    if host.is_empty() {
        return Err(IntelError::invalid("Domain required"));
    }
    Ok(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stubs::Stub;
    use netwatch_core::WhoisFragment;

    fn chain(stubs: Vec<Stub<WhoisFragment>>) -> WhoisLookup {
        WhoisLookup::new(
            stubs
                .into_iter()
                .map(|s| Box::new(s) as Box<WhoisAdapter>)
                .collect(),
        )
    }

    #[test]
    fn cleans_urls_down_to_host() {
        assert_eq!(clean_domain("https://www.Example.COM/path?q=1").unwrap(), "example.com");
        assert_eq!(clean_domain("http://example.org").unwrap(), "example.org");
        assert_eq!(clean_domain("  sub.example.net/ ").unwrap(), "sub.example.net");
        assert!(clean_domain("https://").unwrap_err().is_invalid_input());
        assert!(clean_domain("").unwrap_err().is_invalid_input());
    }

    #[tokio::test]
    async fn dns_only_fallback_is_used_last() {
        let dns = WhoisFragment {
            registrar: Some("Unknown (DNS Only)".into()),
            status: vec!["active".into()],
            name_servers: vec!["ns1.example.com".into()],
            ..WhoisFragment::default()
        };
        let service = chain(vec![
            Stub::down("who-dat.as93.net"),
            Stub::down("rdap.org"),
            Stub::err(
                "whoisfreaks.com",
                netwatch_core::SourceError::NotConfigured {
                    provider: "whoisfreaks.com",
                },
            ),
            Stub::ok("dns.google", dns),
        ]);

        let record = service.lookup("www.example.com").await.unwrap();
        assert_eq!(record.domain, "example.com");
        assert_eq!(record.source, "dns.google");
        assert_eq!(record.registrar, "Unknown (DNS Only)");
        assert_eq!(record.created_date, "Unknown");
        assert_eq!(record.domain_age, "Unknown");
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn total_failure_yields_error_record() {
        let service = chain(vec![Stub::down("rdap.org"), Stub::not_found("dns.google")]);
        let record = service.lookup("nonexistent.invalid").await.unwrap();
        assert_eq!(record.error.as_deref(), Some("All WHOIS sources unavailable"));
        assert_eq!(record.domain, "nonexistent.invalid");
    }

    #[tokio::test]
    async fn first_source_wins() {
        let service = chain(vec![
            Stub::ok(
                "who-dat.as93.net",
                WhoisFragment {
                    registrar: Some("Gandi SAS".into()),
                    ..WhoisFragment::default()
                },
            ),
            Stub::ok("rdap.org", WhoisFragment::default()),
        ]);
        let record = service.lookup("gandi.net").await.unwrap();
        assert_eq!(record.source, "who-dat.as93.net");
        assert_eq!(record.registrar, "Gandi SAS");
    }
}
