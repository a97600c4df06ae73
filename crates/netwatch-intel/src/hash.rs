//! File hash verdicts across malware databases.

use netwatch_core::{
    HashAdapter, HashKind, HashMatch, HashRecord, IntelError, Result, SourceError, SourceResult,
};
use tracing::{debug, instrument};

use crate::sequencer::fan_out;

/// Concurrent lookup across every configured malware database
pub struct HashLookup {
    databases: Vec<Box<HashAdapter>>,
}

impl HashLookup {
    pub fn new(databases: Vec<Box<HashAdapter>>) -> Self {
        Self { databases }
    }

    /// Verdict for an MD5, SHA-1 or SHA-256 hex digest
    #[instrument(skip(self))]
    pub async fn lookup(&self, hash: &str) -> Result<HashRecord> {
        let hash = hash.trim().to_lowercase();
        if hash.is_empty() {
            return Err(IntelError::invalid("Hash is required"));
        }
        let kind = HashKind::detect(&hash).ok_or_else(|| IntelError::invalid("Invalid hash format"))?;
        debug!(?kind, "querying malware databases");

        Ok(verdict(fan_out(&self.databases, hash.as_str()).await))
    }
}

/// Reduce per-database outcomes to one record.
///
/// The first hit in declaration order wins. With no hit, the sample is
/// clean only if every database explicitly said so.
fn verdict(outcomes: Vec<(&'static str, SourceResult<HashMatch>)>) -> HashRecord {
    let answered: Vec<String> = outcomes
        .iter()
        .filter(|(_, outcome)| outcome.as_ref().err().map_or(true, SourceError::is_not_found))
        .map(|(provider, _)| (*provider).to_string())
        .collect();
    let all_answered = answered.len() == outcomes.len();

    let hit = outcomes
        .into_iter()
        .find_map(|(provider, outcome)| outcome.ok().map(|hit| (provider, hit)));

    match hit {
        Some((provider, hit)) => HashRecord::malicious(provider, hit, answered),
        None if all_answered => HashRecord::clean(answered),
        None => HashRecord::partial(answered),
    }
}
