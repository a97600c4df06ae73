//! Multi-source lookups for netwatch.
//!
//! Each lookup service queries several providers, either as an ordered
//! fallback chain ([`sequencer::first_success`]) or all at once
//! ([`sequencer::fan_out`]), merges what comes back into one normalized
//! record and derives scores and verdicts from it.
//!
//! | Service | Policy |
//! |---|---|
//! | [`IpLookup`] | geolocation chain, reputation alongside |
//! | [`WhoisLookup`] | ordered chain, error record on total failure |
//! | [`HashLookup`] | fan-out, first hit wins |
//! | [`FeedAggregator`] | fan-out, partial results kept |
//! | [`EmailChecker`] | MX lookup, DNS failure means no MX |
//! | [`SslChecker`] | single TLS handshake |
//! | [`NewsSearch`] | single provider |
//! | [`LatencyCheck`] | single timed HEAD request |
//!
//! [`Intel`] wires all of them to the real providers.

mod email;
mod feeds;
mod hash;
mod ip;
mod latency;
mod merge;
mod news;
mod ssl;
mod whois;

pub mod sequencer;

#[cfg(any(test, feature = "test-support"))]
pub mod stubs;

pub use email::EmailChecker;
pub use feeds::{FeedAggregator, FeedSource, MergedFeeds};
pub use hash::HashLookup;
pub use ip::IpLookup;
pub use latency::LatencyCheck;
pub use merge::{merge_ip, normalize_whois};
pub use news::{NewsSearch, DEFAULT_TOPIC};
pub use ssl::SslChecker;
pub use whois::WhoisLookup;

use netwatch_client::providers::{
    AbuseIpDb, AlienVault, DnsOverHttps, GoogleNews, HeadProbe, IpApi, IpApiCo, IpWhois,
    MalwareBazaar, PhishTank, Rdap, ThreatFox, UrlhausPayload, UrlhausRecent, WhoDat,
    WhoisFreaks,
};
use netwatch_client::{ApiKeys, HttpTransport, ProviderConfig};
use netwatch_core::{IntelError, Result};
use netwatch_recon::{DnsResolver, TlsProbe};
use tracing::info;

/// Items each feed contributes to the merged list
const URLHAUS_ITEMS: usize = 8;
const ALIENVAULT_ITEMS: usize = 5;
const PHISHTANK_ITEMS: usize = 7;

/// Every lookup service, ready to serve requests
pub struct Intel {
    pub ip: IpLookup,
    pub whois: WhoisLookup,
    pub hashes: HashLookup,
    pub feeds: FeedAggregator,
    pub email: EmailChecker,
    pub ssl: SslChecker,
    pub news: NewsSearch,
    pub latency: LatencyCheck,
}

impl Intel {
    /// Build every service against the configured providers.
    ///
    /// Provider order inside each chain is the preference order.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let http = HttpTransport::new(&config.user_agent)
            .map_err(|e| IntelError::Config(format!("failed to build HTTP client: {e}")))?;
        let resolver =
            DnsResolver::new(config.timeouts.dns()).map_err(|e| IntelError::Config(e.to_string()))?;
        let probe =
            TlsProbe::new(config.timeouts.tls()).map_err(|e| IntelError::Config(e.to_string()))?;

        let intel = Self {
            ip: IpLookup::new(
                vec![
                    Box::new(IpApi::new(http.clone(), config)),
                    Box::new(IpApiCo::new(http.clone(), config)),
                    Box::new(IpWhois::new(http.clone(), config)),
                ],
                Box::new(AbuseIpDb::new(http.clone(), config)),
            ),
            whois: WhoisLookup::new(vec![
                Box::new(WhoDat::new(http.clone(), config)),
                Box::new(Rdap::new(http.clone(), config)),
                Box::new(WhoisFreaks::new(http.clone(), config)),
                Box::new(DnsOverHttps::new(http.clone(), config)),
            ]),
            hashes: HashLookup::new(vec![
                Box::new(MalwareBazaar::new(http.clone(), config)),
                Box::new(ThreatFox::new(http.clone(), config)),
                Box::new(UrlhausPayload::new(http.clone(), config)),
            ]),
            feeds: FeedAggregator::new(vec![
                FeedSource::new(Box::new(UrlhausRecent::new(http.clone(), config)), URLHAUS_ITEMS),
                FeedSource::new(Box::new(AlienVault::new(http.clone(), config)), ALIENVAULT_ITEMS),
                FeedSource::new(Box::new(PhishTank::new(http.clone(), config)), PHISHTANK_ITEMS),
            ]),
            email: EmailChecker::new(Box::new(resolver)),
            ssl: SslChecker::new(Box::new(probe)),
            news: NewsSearch::new(Box::new(GoogleNews::new(http.clone(), config))),
            latency: LatencyCheck::new(Box::new(HeadProbe::new(http, config))),
        };

        info!(
            abuseipdb = ApiKeys::present(config.keys.abuseipdb.as_ref()).is_some(),
            alienvault = ApiKeys::present(config.keys.alienvault.as_ref()).is_some(),
            "lookup services ready"
        );
        Ok(intel)
    }
}
