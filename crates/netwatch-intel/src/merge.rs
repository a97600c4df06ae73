//! Combining provider fragments into normalized records.

use chrono::{DateTime, Utc};
use netwatch_core::score::{self, HIGH_RISK_ABUSE_SCORE};
use netwatch_core::{DomainRecord, GeoFragment, IpRecord, ReputationFragment, WhoisFragment, UNKNOWN};
use std::net::Ipv4Addr;

use crate::sequencer::Sourced;

/// Merge geolocation and abuse reputation into one IP record.
///
/// Fields both fragments can supply prefer the geolocation provider.
pub fn merge_ip(
    ip: Ipv4Addr,
    geo: &Sourced<GeoFragment>,
    reputation: &ReputationFragment,
) -> IpRecord {
    let g = &geo.fragment;

    let location = match (known(g.city.as_deref()), known(g.country.as_deref())) {
        (Some(city), Some(country)) => format!("{city}, {country}"),
        _ => "Unknown Location".to_string(),
    };
    let isp = known(g.isp.as_deref()).or_else(|| known(reputation.isp.as_deref()));
    let (lat, lng) = g.coordinates().unwrap_or((0.0, 0.0));
    let coordinates = match g.coordinates() {
        Some((lat, lon)) => format!("{lat}, {lon}"),
        None => "0, 0".to_string(),
    };

    let abuse_score = score::clamp_score(reputation.abuse_confidence_score.unwrap_or(0).into());
    let is_tor = reputation.is_tor.unwrap_or(false);

    IpRecord {
        ip,
        location,
        isp: isp.unwrap_or("Unknown ISP").to_string(),
        asn: known(g.asn.as_deref()).unwrap_or("N/A").to_string(),
        coordinates,
        lat,
        lng,
        abuse_score,
        total_reports: reputation.total_reports.unwrap_or(0),
        last_reported: reputation.last_reported_at.clone(),
        is_tor,
        is_public: reputation.is_public.unwrap_or(true),
        score: abuse_score,
        tags: ip_tags(
            isp,
            abuse_score,
            is_tor,
            known(reputation.usage_type.as_deref()).or_else(|| known(g.org.as_deref())),
        ),
        source: geo.source.to_string(),
        reputation_source: known(Some(reputation.source.as_str()))
            .unwrap_or("None")
            .to_string(),
    }
}

/// Labels summarizing an address: ISP, risk, anonymity, usage
fn ip_tags(isp: Option<&str>, abuse_score: u8, is_tor: bool, usage: Option<&str>) -> Vec<String> {
    let risk = if abuse_score > HIGH_RISK_ABUSE_SCORE {
        "High Risk"
    } else {
        "Clean"
    };
    let network = if is_tor { "TOR" } else { "Regular" };

    [isp, Some(risk), Some(network), usage]
        .into_iter()
        .flatten()
        .filter(|tag| !tag.is_empty() && *tag != UNKNOWN)
        .map(str::to_string)
        .collect()
}

/// Normalize a WHOIS fragment and derive the domain's age
pub fn normalize_whois(domain: &str, whois: Sourced<WhoisFragment>, now: DateTime<Utc>) -> DomainRecord {
    let age = whois
        .fragment
        .created
        .as_deref()
        .map_or_else(|| UNKNOWN.to_string(), |created| score::domain_age(created, now));
    DomainRecord::from_fragment(domain, whois.fragment, whois.source, age)
}

fn known(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn geo(fragment: GeoFragment) -> Sourced<GeoFragment> {
        Sourced {
            source: fragment.source,
            fragment,
        }
    }

    fn full_geo() -> GeoFragment {
        GeoFragment {
            city: Some("Mountain View".into()),
            country: Some("United States".into()),
            latitude: Some(37.4056),
            longitude: Some(-122.0775),
            isp: Some("Google LLC".into()),
            org: Some("Google Public DNS".into()),
            asn: Some("AS15169 Google LLC".into()),
            source: "ip-api.com",
        }
    }

    #[test]
    fn merges_geo_and_reputation() {
        let reputation = ReputationFragment {
            abuse_confidence_score: Some(0),
            total_reports: Some(12),
            is_tor: Some(false),
            is_public: Some(true),
            usage_type: Some("Content Delivery Network".into()),
            isp: Some("Google".into()),
            source: "AbuseIPDB".into(),
            ..ReputationFragment::default()
        };
        let ip = Ipv4Addr::new(8, 8, 8, 8);

        let record = merge_ip(ip, &geo(full_geo()), &reputation);
        assert_eq!(record.location, "Mountain View, United States");
        assert_eq!(record.isp, "Google LLC");
        assert_eq!(record.asn, "AS15169 Google LLC");
        assert_eq!(record.coordinates, "37.4056, -122.0775");
        assert_eq!(record.total_reports, 12);
        assert_eq!(record.score, 0);
        assert_eq!(
            record.tags,
            vec!["Google LLC", "Clean", "Regular", "Content Delivery Network"]
        );
        assert_eq!(record.source, "ip-api.com");
        assert_eq!(record.reputation_source, "AbuseIPDB");
    }

    #[test]
    fn sparse_fragments_get_defaults() {
        let record = merge_ip(
            Ipv4Addr::new(203, 0, 113, 9),
            &geo(GeoFragment::empty("ipwhois.app")),
            &ReputationFragment::not_configured("AbuseIPDB"),
        );
        assert_eq!(record.location, "Unknown Location");
        assert_eq!(record.isp, "Unknown ISP");
        assert_eq!(record.asn, "N/A");
        assert_eq!(record.coordinates, "0, 0");
        assert_eq!((record.lat, record.lng), (0.0, 0.0));
        assert_eq!(record.abuse_score, 0);
        assert!(record.last_reported.is_none());
        assert!(!record.is_tor);
        assert!(record.is_public);
        assert_eq!(record.tags, vec!["Clean", "Regular"]);
        assert_eq!(record.reputation_source, "No AbuseIPDB API key configured");
    }

    #[test]
    fn reputation_fills_missing_isp() {
        let mut fragment = full_geo();
        fragment.isp = Some(" ".into());
        let reputation = ReputationFragment {
            isp: Some("Hetzner Online GmbH".into()),
            abuse_confidence_score: Some(87),
            is_tor: Some(true),
            source: "AbuseIPDB".into(),
            ..ReputationFragment::default()
        };

        let record = merge_ip(Ipv4Addr::new(1, 2, 3, 4), &geo(fragment), &reputation);
        assert_eq!(record.isp, "Hetzner Online GmbH");
        assert_eq!(record.score, 87);
        assert_eq!(
            record.tags,
            vec!["Hetzner Online GmbH", "High Risk", "TOR", "Google Public DNS"]
        );
    }

    #[test]
    fn tags_drop_unknown_values() {
        let tags = ip_tags(Some("Unknown"), 51, false, Some(""));
        assert_eq!(tags, vec!["High Risk", "Regular"]);
        assert_eq!(ip_tags(None, 50, false, None), vec!["Clean", "Regular"]);
    }

    #[test]
    fn whois_record_carries_age_and_source() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let whois = Sourced {
            source: "rdap.org",
            fragment: WhoisFragment {
                registrar: Some("MarkMonitor Inc.".into()),
                created: Some("2014-06-02".into()),
                ..WhoisFragment::default()
            },
        };

        let record = normalize_whois("example.com", whois, now);
        assert_eq!(record.domain_age, "9y 1m");
        assert_eq!(record.source, "rdap.org");
        assert_eq!(record.created_date, "2014-06-02");
        assert_eq!(record.expiry_date, UNKNOWN);
    }

    #[test]
    fn whois_without_creation_date_has_unknown_age() {
        let whois = Sourced {
            source: "dns.google",
            fragment: WhoisFragment::default(),
        };
        let record = normalize_whois("example.com", whois, Utc::now());
        assert_eq!(record.domain_age, UNKNOWN);
    }
}
