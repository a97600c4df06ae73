//! The adapter contract every external provider implements.

use async_trait::async_trait;
use std::net::Ipv4Addr;

use crate::error::SourceResult;
use crate::types::{
    FeedItem, GeoFragment, HashMatch, LatencySample, NewsArticle, ReputationFragment,
    WhoisFragment,
};

/// One external data provider behind a narrow fetch-by-key interface.
///
/// `Q` is the query key (an IP, a domain, a hash, or `()` for feeds) and
/// [`SourceAdapter::Fragment`] is the partial record the provider can supply.
/// Implementations own their auth, timeout and error classification.
#[async_trait]
pub trait SourceAdapter<Q: ?Sized + Sync>: Send + Sync {
    /// Partial record produced on success
    type Fragment: Send;

    /// Provider name used for provenance and logging
    fn name(&self) -> &'static str;

    /// Query the provider
    async fn fetch(&self, query: &Q) -> SourceResult<Self::Fragment>;
}

/// IP geolocation provider
pub type GeoAdapter = dyn SourceAdapter<Ipv4Addr, Fragment = GeoFragment>;

/// IP abuse-reputation provider
pub type ReputationAdapter = dyn SourceAdapter<Ipv4Addr, Fragment = ReputationFragment>;

/// Domain registration provider
pub type WhoisAdapter = dyn SourceAdapter<str, Fragment = WhoisFragment>;

/// Malware hash database
pub type HashAdapter = dyn SourceAdapter<str, Fragment = HashMatch>;

/// Threat feed
pub type FeedAdapter = dyn SourceAdapter<(), Fragment = Vec<FeedItem>>;

/// News search provider
pub type NewsAdapter = dyn SourceAdapter<str, Fragment = Vec<NewsArticle>>;

/// Timed reachability check against a URL
pub type LatencyAdapter = dyn SourceAdapter<str, Fragment = LatencySample>;
