//! Canned adapters and probes for lookup tests.

use async_trait::async_trait;
use netwatch_core::{MxRecord, SourceAdapter, SourceError, SourceResult};
use netwatch_recon::{CertificateProbe, MxResolver, ReconError, ReconResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared call counter
#[derive(Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Adapter that always returns the same outcome
pub struct Stub<F> {
    name: &'static str,
    outcome: SourceResult<F>,
    delay: Option<Duration>,
    calls: Calls,
}

impl<F> Stub<F> {
    pub fn ok(name: &'static str, fragment: F) -> Self {
        Self::with(name, Ok(fragment))
    }

    pub fn err(name: &'static str, error: SourceError) -> Self {
        Self::with(name, Err(error))
    }

    pub fn not_found(name: &'static str) -> Self {
        Self::err(name, SourceError::NotFound { provider: name })
    }

    pub fn down(name: &'static str) -> Self {
        Self::err(name, SourceError::unavailable(name, "HTTP 503"))
    }

    fn with(name: &'static str, outcome: SourceResult<F>) -> Self {
        Self {
            name,
            outcome,
            delay: None,
            calls: Calls::default(),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.clone()
    }
}

#[async_trait]
impl<Q, F> SourceAdapter<Q> for Stub<F>
where
    Q: ?Sized + Sync,
    F: Clone + Send + Sync,
{
    type Fragment = F;

    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _query: &Q) -> SourceResult<F> {
        self.calls.hit();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}

/// Resolver with a fixed answer per call
pub struct StubResolver {
    records: Option<Vec<MxRecord>>,
    calls: Calls,
}

impl StubResolver {
    pub fn answering(records: Vec<MxRecord>) -> Self {
        Self {
            records: Some(records),
            calls: Calls::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            records: None,
            calls: Calls::default(),
        }
    }

    pub fn calls(&self) -> Calls {
        self.calls.clone()
    }
}

#[async_trait]
impl MxResolver for StubResolver {
    async fn mx_records(&self, _domain: &str) -> ReconResult<Vec<MxRecord>> {
        self.calls.hit();
        self.records
            .clone()
            .ok_or_else(|| ReconError::Dns("no answer".to_string()))
    }
}

/// Probe that returns fixed DER bytes or a handshake error
pub struct StubProbe {
    der: Option<Vec<u8>>,
    calls: Calls,
}

impl StubProbe {
    pub fn presenting(der: Vec<u8>) -> Self {
        Self {
            der: Some(der),
            calls: Calls::default(),
        }
    }

    pub fn refusing() -> Self {
        Self {
            der: None,
            calls: Calls::default(),
        }
    }

    pub fn calls(&self) -> Calls {
        self.calls.clone()
    }
}

#[async_trait]
impl CertificateProbe for StubProbe {
    async fn leaf_certificate(&self, _host: &str) -> ReconResult<Vec<u8>> {
        self.calls.hit();
        self.der.clone().ok_or(ReconError::NoCertificate)
    }
}
