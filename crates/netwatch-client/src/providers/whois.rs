//! Domain registration providers, in fallback order.

use async_trait::async_trait;
use netwatch_core::time::date_part;
use netwatch_core::{SourceAdapter, SourceError, SourceResult, WhoisFragment};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::instrument;

use super::{first_text, present, strings, text};
use crate::config::{ApiKeys, ProviderConfig};
use crate::transport::{endpoint, HttpTransport};

/// Registrar label used by the DNS-only fallback
const DNS_ONLY_REGISTRAR: &str = "Unknown (DNS Only)";

/// DNS record type for NS answers
const NS_RECORD: u16 = 2;

/// who-dat.as93.net, a free WHOIS-to-JSON service.
///
/// Field names vary between registries so the payload is read loosely.
pub struct WhoDat {
    transport: HttpTransport,
    base_url: String,
    timeout: Duration,
}

impl WhoDat {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self {
            transport,
            base_url: config.endpoints.who_dat.clone(),
            timeout: config.timeouts.whois(),
        }
    }
}

#[async_trait]
impl SourceAdapter<str> for WhoDat {
    type Fragment = WhoisFragment;

    fn name(&self) -> &'static str {
        "who-dat.as93.net"
    }

    #[instrument(skip(self), fields(provider = "who-dat.as93.net"))]
    async fn fetch(&self, domain: &str) -> SourceResult<WhoisFragment> {
        let url = endpoint(self.name(), &self.base_url, &[domain])?;
        let request = self.transport.get(url).header("Accept", "application/json");
        let data: Value = self.transport.json(self.name(), request, self.timeout).await?;

        if !data.is_object() {
            return Err(SourceError::malformed(self.name(), "expected a JSON object"));
        }
        if let Some(reason) = text(&data["error"]) {
            return Err(SourceError::unavailable(self.name(), reason));
        }

        let registrant = &data["registrant"];
        Ok(WhoisFragment {
            registrar: text(&data["registrar"]).or_else(|| text(&data["registrar"]["name"])),
            created: first_text(&data, &["created", "creation_date"]),
            expires: first_text(&data, &["expires", "expiry_date"]),
            updated: first_text(&data, &["updated", "updated_date"]),
            status: strings(&data["status"]),
            name_servers: first_list(&data, &["nameservers", "name_servers"]),
            registrant_org: text(&registrant["organization"]).or_else(|| text(&data["org"])),
            registrant_country: text(&registrant["country"]).or_else(|| text(&data["country"])),
            dnssec: text(&data["dnssec"]),
        })
    }
}

/// First non-empty list among several candidate keys
fn first_list(value: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .map(|key| strings(&value[*key]))
        .find(|list| !list.is_empty())
        .unwrap_or_default()
}

/// rdap.org bootstrap redirector for the Registration Data Access Protocol
pub struct Rdap {
    transport: HttpTransport,
    base_url: String,
    timeout: Duration,
}

impl Rdap {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self {
            transport,
            base_url: config.endpoints.rdap.clone(),
            timeout: config.timeouts.whois(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RdapDomain {
    #[serde(default)]
    nameservers: Vec<RdapNameserver>,
    #[serde(default)]
    entities: Vec<RdapEntity>,
    #[serde(default)]
    events: Vec<RdapEvent>,
    #[serde(default)]
    status: Vec<String>,
    #[serde(rename = "secureDNS")]
    secure_dns: Option<RdapSecureDns>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RdapNameserver {
    ldh_name: Option<String>,
    unicode_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RdapEntity {
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    vcard_array: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RdapEvent {
    event_action: String,
    event_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RdapSecureDns {
    #[serde(default)]
    delegation_signed: bool,
}

impl RdapDomain {
    /// `fn` property of the registrar entity's vCard
    fn registrar(&self) -> Option<String> {
        let entity = self
            .entities
            .iter()
            .find(|e| e.roles.iter().any(|r| r == "registrar"))?;

        entity.vcard_array[1]
            .as_array()?
            .iter()
            .find(|property| property[0].as_str() == Some("fn"))
            .and_then(|property| text(&property[3]))
    }

    fn event(&self, action: &str) -> Option<String> {
        self.events
            .iter()
            .find(|e| e.event_action == action)
            .and_then(|e| present(e.event_date.clone()))
            .map(|date| date_part(&date))
    }
}

#[async_trait]
impl SourceAdapter<str> for Rdap {
    type Fragment = WhoisFragment;

    fn name(&self) -> &'static str {
        "rdap.org"
    }

    #[instrument(skip(self), fields(provider = "rdap.org"))]
    async fn fetch(&self, domain: &str) -> SourceResult<WhoisFragment> {
        let url = endpoint(self.name(), &self.base_url, &["domain", domain])?;
        let request = self.transport.get(url).header("Accept", "application/json");
        let data: RdapDomain = self.transport.json(self.name(), request, self.timeout).await?;

        let signed = data.secure_dns.as_ref().is_some_and(|s| s.delegation_signed);
        Ok(WhoisFragment {
            registrar: data.registrar(),
            created: data.event("registration"),
            expires: data.event("expiration"),
            updated: data.event("last changed"),
            name_servers: data
                .nameservers
                .iter()
                .filter_map(|ns| present(ns.ldh_name.clone().or_else(|| ns.unicode_name.clone())))
                .collect(),
            status: data.status,
            registrant_org: None,
            registrant_country: None,
            dnssec: Some(if signed { "Signed" } else { "Unsigned" }.to_string()),
        })
    }
}

/// WhoisFreaks live lookup. Works keyless for some TLDs.
pub struct WhoisFreaks {
    transport: HttpTransport,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl WhoisFreaks {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self {
            transport,
            base_url: config.endpoints.whoisfreaks.clone(),
            api_key: ApiKeys::present(config.keys.whoisfreaks.as_ref()).map(String::from),
            timeout: config.timeouts.whois(),
        }
    }
}

#[async_trait]
impl SourceAdapter<str> for WhoisFreaks {
    type Fragment = WhoisFragment;

    fn name(&self) -> &'static str {
        "whoisfreaks.com"
    }

    #[instrument(skip(self), fields(provider = "whoisfreaks.com"))]
    async fn fetch(&self, domain: &str) -> SourceResult<WhoisFragment> {
        let url = endpoint(self.name(), &self.base_url, &["v1.0", "whois"])?;
        let mut query = vec![("whois", "live"), ("domainName", domain)];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("apiKey", key));
        }
        let request = self
            .transport
            .get(url)
            .query(&query)
            .header("Accept", "application/json");
        let data: Value = self.transport.json(self.name(), request, self.timeout).await?;

        if text(&data["status"]).as_deref() == Some("0") || !data["error"].is_null() {
            return Err(SourceError::unavailable(self.name(), "lookup rejected"));
        }

        let registrant = &data["registrant"];
        Ok(WhoisFragment {
            registrar: text(&data["registrar"]["name"]),
            created: text(&data["create_date"]),
            expires: text(&data["expiry_date"]),
            updated: text(&data["update_date"]),
            status: strings(&data["domain_status"]),
            name_servers: strings(&data["name_servers"]),
            registrant_org: text(&registrant["organization"]),
            registrant_country: text(&registrant["country"]),
            dnssec: None,
        })
    }
}

/// Google DNS-over-HTTPS NS query, the last-resort source.
///
/// Only name servers and the DNSSEC validation bit are available; a
/// non-zero DNS status (e.g. NXDOMAIN) is reported as `NotFound`.
pub struct DnsOverHttps {
    transport: HttpTransport,
    base_url: String,
    timeout: Duration,
}

impl DnsOverHttps {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self {
            transport,
            base_url: config.endpoints.google_dns.clone(),
            timeout: config.timeouts.dns(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DnsResponse {
    #[serde(rename = "Status", default)]
    status: u32,
    #[serde(rename = "AD", default)]
    authenticated: bool,
    #[serde(rename = "Answer", default)]
    answer: Vec<DnsAnswer>,
}

#[derive(Debug, Deserialize)]
struct DnsAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

#[async_trait]
impl SourceAdapter<str> for DnsOverHttps {
    type Fragment = WhoisFragment;

    fn name(&self) -> &'static str {
        "dns.google"
    }

    #[instrument(skip(self), fields(provider = "dns.google"))]
    async fn fetch(&self, domain: &str) -> SourceResult<WhoisFragment> {
        let url = endpoint(self.name(), &self.base_url, &["resolve"])?;
        let request = self
            .transport
            .get(url)
            .query(&[("name", domain), ("type", "NS")]);
        let data: DnsResponse = self.transport.json(self.name(), request, self.timeout).await?;

        if data.status != 0 {
            return Err(SourceError::NotFound {
                provider: self.name(),
            });
        }

        Ok(WhoisFragment {
            registrar: Some(DNS_ONLY_REGISTRAR.to_string()),
            status: vec!["active".to_string()],
            name_servers: data
                .answer
                .into_iter()
                .filter(|a| a.record_type == NS_RECORD)
                .map(|a| a.data.trim_end_matches('.').to_string())
                .collect(),
            dnssec: data.authenticated.then(|| "Validated".to_string()),
            ..WhoisFragment::default()
        })
    }
}
