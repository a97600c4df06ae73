//! Source adapters, one per external provider.
//!
//! Each adapter owns its endpoint, credentials and timeout, and converts the
//! provider's response into a fragment. Anything the provider leaves out
//! stays `None`; adapters never fill in guesses.

mod abusech;
mod abuseipdb;
mod feeds;
mod geo;
mod latency;
mod news;
mod whois;

pub use abusech::{MalwareBazaar, ThreatFox, UrlhausPayload};
pub use abuseipdb::AbuseIpDb;
pub use feeds::{AlienVault, PhishTank, UrlhausRecent};
pub use geo::{IpApi, IpApiCo, IpWhois};
pub use latency::{HeadProbe, TIMED_OUT};
pub use news::GoogleNews;
pub use whois::{DnsOverHttps, Rdap, WhoDat, WhoisFreaks};

use serde_json::Value;

/// Drop blank strings
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a JSON value as text, accepting strings and numbers
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => present(Some(s.clone())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a JSON value as a list of strings.
///
/// A lone string is treated as a one-element list.
fn strings(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        other => text(other).into_iter().collect(),
    }
}

/// First non-blank text among several candidate keys
fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(&value[*key]))
}

/// Render an autonomous system label as `"AS{number} {org}"`
fn as_label(asn: &Value, org: Option<&str>) -> Option<String> {
    let raw = text(asn)?;
    let number = raw
        .strip_prefix("AS")
        .or_else(|| raw.strip_prefix("as"))
        .unwrap_or(&raw);

    Some(match org.map(str::trim).filter(|o| !o.is_empty()) {
        Some(org) => format!("AS{number} {org}"),
        None => format!("AS{number}"),
    })
}
