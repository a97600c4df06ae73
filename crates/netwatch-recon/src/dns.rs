//! MX record resolution.

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use netwatch_core::MxRecord;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{ReconError, ReconResult};

/// Mail exchanger lookup
#[async_trait]
pub trait MxResolver: Send + Sync {
    /// MX records for `domain`, lowest preference first
    async fn mx_records(&self, domain: &str) -> ReconResult<Vec<MxRecord>>;
}

/// System-configured hickory resolver
pub struct DnsResolver {
    resolver: TokioResolver,
    timeout: Duration,
}

impl DnsResolver {
    /// Build a resolver from the host's resolv.conf (or platform equivalent).
    ///
    /// `timeout` bounds each lookup as a whole, retries included.
    pub fn new(timeout: Duration) -> ReconResult<Self> {
        let resolver = TokioResolver::builder_tokio()
            .map_err(|e| ReconError::Dns(format!("failed to create resolver: {e}")))?
            .build();
        Ok(Self { resolver, timeout })
    }
}

#[async_trait]
impl MxResolver for DnsResolver {
    #[instrument(skip(self))]
    async fn mx_records(&self, domain: &str) -> ReconResult<Vec<MxRecord>> {
        let lookup = tokio::time::timeout(self.timeout, self.resolver.mx_lookup(domain))
            .await
            .map_err(|_| ReconError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| ReconError::Dns(e.to_string()))?;

        let records = sort_by_preference(
            lookup
                .iter()
                .map(|mx| MxRecord {
                    exchange: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
                    priority: mx.preference(),
                })
                .collect(),
        );
        debug!(count = records.len(), "MX lookup complete");
        Ok(records)
    }
}

/// Stable sort by ascending preference
fn sort_by_preference(mut records: Vec<MxRecord>) -> Vec<MxRecord> {
    records.sort_by_key(|r| r.priority);
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mx(exchange: &str, priority: u16) -> MxRecord {
        MxRecord {
            exchange: exchange.to_string(),
            priority,
        }
    }

    #[test]
    fn sorts_lowest_preference_first() {
        let sorted = sort_by_preference(vec![
            mx("alt2.aspmx.l.google.com", 20),
            mx("aspmx.l.google.com", 1),
            mx("alt1.aspmx.l.google.com", 5),
            mx("alt3.aspmx.l.google.com", 20),
        ]);
        let order: Vec<_> = sorted.iter().map(|r| r.exchange.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "aspmx.l.google.com",
                "alt1.aspmx.l.google.com",
                "alt2.aspmx.l.google.com",
                "alt3.aspmx.l.google.com",
            ]
        );
    }
}
