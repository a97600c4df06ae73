//! URL reachability timing.

use chrono::{SecondsFormat, Utc};
use netwatch_core::{IntelError, LatencyAdapter, LatencyReport, Result};
use tracing::instrument;

/// Times a HEAD request against a caller-supplied URL
pub struct LatencyCheck {
    probe: Box<LatencyAdapter>,
}

impl LatencyCheck {
    pub fn new(probe: Box<LatencyAdapter>) -> Self {
        Self { probe }
    }

    /// Round-trip time to `target`; bare hosts are requested over HTTPS
    #[instrument(skip(self))]
    pub async fn check(&self, target: &str) -> Result<LatencyReport> {
        let target = normalize_target(target)?;
        let sample = self.probe.fetch(&target).await?;
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        Ok(LatencyReport::new(target, sample, timestamp))
    }
}

fn normalize_target(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(IntelError::invalid("Target URL is required"));
    }
    Ok(if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    })
}
