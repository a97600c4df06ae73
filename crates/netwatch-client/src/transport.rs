//! Shared HTTP transport used by every adapter.

use netwatch_core::{SourceError, SourceResult};
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Connection timeout applied to every provider
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Pooled HTTP client that classifies failures into [`SourceError`].
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    http: HttpClient,
}

impl HttpTransport {
    /// Build a transport that sends `user_agent` with every request
    pub fn new(user_agent: &str) -> reqwest::Result<Self> {
        let http = HttpClient::builder()
            .user_agent(user_agent)
            .connect_timeout(CONNECT_TIMEOUT)
            .gzip(true)
            .build()?;

        Ok(Self {
            inner: Arc::new(TransportInner { http }),
        })
    }

    /// Start a GET request
    pub fn get(&self, url: Url) -> RequestBuilder {
        debug!(url = %url, "GET request");
        self.inner.http.get(url)
    }

    /// Start a HEAD request
    pub fn head(&self, url: Url) -> RequestBuilder {
        debug!(url = %url, "HEAD request");
        self.inner.http.head(url)
    }

    /// Start a POST request
    pub fn post(&self, url: Url) -> RequestBuilder {
        debug!(url = %url, "POST request");
        self.inner.http.post(url)
    }

    /// Send a request and decode a JSON body.
    ///
    /// Non-2xx responses and network errors are `Unavailable`; a body that
    /// does not match `T` is `Malformed`.
    pub async fn json<T: DeserializeOwned>(
        &self,
        provider: &'static str,
        request: RequestBuilder,
        timeout: Duration,
    ) -> SourceResult<T> {
        let body = self.text(provider, request, timeout).await?;
        serde_json::from_str(&body).map_err(|e| SourceError::malformed(provider, e.to_string()))
    }

    /// Send a request and return the body as text
    pub async fn text(
        &self,
        provider: &'static str,
        request: RequestBuilder,
        timeout: Duration,
    ) -> SourceResult<String> {
        let response = self.send(provider, request, timeout).await?;
        response
            .text()
            .await
            .map_err(|e| classify(provider, &e, timeout))
    }

    async fn send(
        &self,
        provider: &'static str,
        request: RequestBuilder,
        timeout: Duration,
    ) -> SourceResult<Response> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(provider, &e, timeout))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 429 {
            warn!(provider, "Rate limited by provider");
        }
        Err(SourceError::unavailable(
            provider,
            format!("HTTP {}", status.as_u16()),
        ))
    }
}

/// Map a reqwest error onto the adapter taxonomy
fn classify(provider: &'static str, error: &reqwest::Error, timeout: Duration) -> SourceError {
    if error.is_timeout() {
        SourceError::unavailable(
            provider,
            format!("timed out after {}s", timeout.as_secs()),
        )
    } else if error.is_decode() {
        SourceError::malformed(provider, error.to_string())
    } else {
        SourceError::unavailable(provider, error.to_string())
    }
}

/// Join path segments onto a configured base URL.
///
/// Segments are percent-encoded, so caller input never alters the path
/// structure. An unparseable base is reported as `Unavailable`.
pub fn endpoint(provider: &'static str, base: &str, segments: &[&str]) -> SourceResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| SourceError::unavailable(provider, format!("invalid endpoint: {e}")))?;

    url.path_segments_mut()
        .map_err(|()| SourceError::unavailable(provider, "endpoint cannot be a base"))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}
