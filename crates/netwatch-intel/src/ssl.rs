//! TLS certificate checks.

use chrono::Utc;
use netwatch_core::{CertificateReport, IntelError, Result, SourceError};
use netwatch_recon::{inspect_certificate, CertificateProbe};
use regex::Regex;
use std::sync::OnceLock;
use tracing::instrument;

fn host_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid host pattern"))
}

/// Fetches and summarizes a host's leaf certificate
pub struct SslChecker {
    probe: Box<dyn CertificateProbe>,
}

impl SslChecker {
    pub fn new(probe: Box<dyn CertificateProbe>) -> Self {
        Self { probe }
    }

    /// Certificate summary for `target`, which may be a bare host or a URL
    #[instrument(skip(self))]
    pub async fn check(&self, target: &str) -> Result<CertificateReport> {
        let host = clean_host(target)?;

        let der = self
            .probe
            .leaf_certificate(host)
            .await
            .map_err(SourceError::from)?;
        Ok(inspect_certificate(&der, Utc::now()).map_err(SourceError::from)?)
    }
}

fn clean_host(target: &str) -> Result<&str> {
    let target = target.trim();
    if target.is_empty() {
        return Err(IntelError::invalid("Target domain is required"));
    }
    let target = target
        .strip_prefix("https://")
        .or_else(|| target.strip_prefix("http://"))
        .unwrap_or(target);
    let host = target.split('/').next().unwrap_or_default();

    if host_pattern().is_match(host) {
        Ok(host)
    } else {
        Err(IntelError::invalid("Invalid domain format"))
    }
}
