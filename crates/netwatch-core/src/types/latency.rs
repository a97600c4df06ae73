use serde::{Deserialize, Serialize};

/// One timed HEAD request.
///
/// Any HTTP status counts as an answer; only transport failures are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencySample {
    /// Response status code
    pub status: u16,
    /// Canonical reason phrase, empty for unregistered codes
    pub status_text: String,
    /// Round trip in whole milliseconds
    pub elapsed_ms: u64,
}

/// Latency check result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyReport {
    /// URL that was requested
    pub target: String,
    pub latency_ms: u64,
    pub status: u16,
    pub status_text: String,
    /// RFC 3339 time of the check
    pub timestamp: String,
}

impl LatencyReport {
    #[must_use]
    pub fn new(target: String, sample: LatencySample, timestamp: String) -> Self {
        Self {
            target,
            latency_ms: sample.elapsed_ms,
            status: sample.status,
            status_text: sample.status_text,
            timestamp,
        }
    }
}
