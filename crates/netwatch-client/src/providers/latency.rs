//! Reachability timing for arbitrary URLs.

use async_trait::async_trait;
use netwatch_core::{LatencySample, SourceAdapter, SourceError, SourceResult};
use std::time::{Duration, Instant};
use tracing::instrument;
use url::Url;

use crate::config::ProviderConfig;
use crate::transport::HttpTransport;

/// Reason reported when the target does not answer in time
pub const TIMED_OUT: &str = "Connection timed out";

/// Times a single HEAD request.
///
/// Unlike the data providers, any HTTP status is a successful answer: the
/// check measures reachability, not health.
pub struct HeadProbe {
    transport: HttpTransport,
    timeout: Duration,
}

impl HeadProbe {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self {
            transport,
            timeout: config.timeouts.latency(),
        }
    }
}

#[async_trait]
impl SourceAdapter<str> for HeadProbe {
    type Fragment = LatencySample;

    fn name(&self) -> &'static str {
        "latency-check"
    }

    #[instrument(skip(self), fields(provider = "latency-check"))]
    async fn fetch(&self, target: &str) -> SourceResult<LatencySample> {
        let url = Url::parse(target)
            .map_err(|e| SourceError::unavailable(self.name(), format!("invalid URL: {e}")))?;

        let started = Instant::now();
        let response = self
            .transport
            .head(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::unavailable(self.name(), TIMED_OUT)
                } else {
                    SourceError::unavailable(self.name(), e.to_string())
                }
            })?;
        let elapsed = started.elapsed();

        let status = response.status();
        Ok(LatencySample {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn probe(timeout_secs: u64) -> HeadProbe {
        let mut config = ProviderConfig::default();
        config.timeouts.latency_secs = timeout_secs;
        HeadProbe::new(HttpTransport::new("netwatch-test").unwrap(), &config)
    }

    #[tokio::test]
    async fn times_head_request() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_millis(40)))
            .expect(1)
            .mount(&server)
            .await;

        let sample = assert_ok!(probe(10).fetch(&format!("{}/status", server.uri())).await);
        assert_eq!(sample.status, 204);
        assert_eq!(sample.status_text, "No Content");
        assert!(sample.elapsed_ms >= 40);
    }

    #[tokio::test]
    async fn error_status_is_still_an_answer() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let sample = assert_ok!(probe(10).fetch(&server.uri()).await);
        assert_eq!(sample.status, 503);
        assert_eq!(sample.status_text, "Service Unavailable");
    }

    #[tokio::test]
    async fn slow_target_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let err = assert_err!(probe(1).fetch(&server.uri()).await);
        assert_eq!(err, SourceError::unavailable("latency-check", TIMED_OUT));
    }

    #[tokio::test]
    async fn unparseable_target_is_unavailable() {
        let err = assert_err!(probe(1).fetch("https://").await);
        assert!(err.is_unavailable());
        assert_eq!(err.reason(), Some("invalid URL: empty host"));
    }
}
