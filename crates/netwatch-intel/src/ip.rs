//! IP lookups: geolocation chain plus abuse reputation.

use netwatch_core::{
    GeoAdapter, IntelError, IpRecord, ReputationAdapter, ReputationFragment, ReputationReport,
    Result, SourceError,
};
use std::net::Ipv4Addr;
use tracing::{instrument, warn};

use crate::merge::merge_ip;
use crate::sequencer::first_success;

/// Geolocation chain plus one reputation provider
pub struct IpLookup {
    geo: Vec<Box<GeoAdapter>>,
    reputation: Box<ReputationAdapter>,
}

impl IpLookup {
    /// `geo` is tried in order; `reputation` runs alongside it
    pub fn new(geo: Vec<Box<GeoAdapter>>, reputation: Box<ReputationAdapter>) -> Self {
        Self { geo, reputation }
    }

    /// Look up a dotted-quad IPv4 address.
    ///
    /// Fails only when the input is not IPv4 or every geolocation provider
    /// failed; a reputation failure is folded into the record.
    #[instrument(skip(self))]
    pub async fn lookup(&self, target: &str) -> Result<IpRecord> {
        let ip = parse_ipv4(target)?;

        let (geo, reputation) = tokio::join!(first_success(&self.geo, &ip), self.reputation(ip));
        Ok(merge_ip(ip, &geo?, &reputation))
    }

    /// Reputation on its own, with the same fallbacks and defaults the
    /// merged record uses
    #[instrument(skip(self))]
    pub async fn reputation_only(&self, target: &str) -> Result<ReputationReport> {
        let ip = parse_ipv4(target)?;
        Ok(ReputationReport::new(ip, self.reputation(ip).await))
    }

    async fn reputation(&self, ip: Ipv4Addr) -> ReputationFragment {
        match self.reputation.fetch(&ip).await {
            Ok(fragment) => fragment,
            Err(SourceError::NotConfigured { provider }) => {
                ReputationFragment::not_configured(provider)
            }
            Err(e) => {
                warn!(provider = e.provider(), error = %e, "reputation check failed");
                ReputationFragment::unavailable(e.provider())
            }
        }
    }
}

fn parse_ipv4(target: &str) -> Result<Ipv4Addr> {
    target
        .trim()
        .parse()
        .map_err(|_| IntelError::invalid("Invalid IP format"))
}
