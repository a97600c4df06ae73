//! TLS handshakes for certificate inspection.
//!
//! The probe is an inspection tool: it completes the handshake whatever the
//! chain looks like so that expired, self-signed and mismatched certificates
//! can still be reported. Handshake signatures are still checked.

use async_trait::async_trait;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{
    ring as ring_provider, verify_tls12_signature, verify_tls13_signature, CryptoProvider,
};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::{debug, instrument};

use crate::error::{ReconError, ReconResult};

const HTTPS_PORT: u16 = 443;

/// Something that can fetch a host's leaf certificate
#[async_trait]
pub trait CertificateProbe: Send + Sync {
    /// DER bytes of the certificate `host` presents on port 443
    async fn leaf_certificate(&self, host: &str) -> ReconResult<Vec<u8>>;
}

/// rustls-backed probe
pub struct TlsProbe {
    connector: TlsConnector,
    port: u16,
    timeout: Duration,
}

impl TlsProbe {
    /// Build a probe that connects to port 443 with the given timeout
    pub fn new(timeout: Duration) -> ReconResult<Self> {
        Self::with_port(HTTPS_PORT, timeout)
    }

    /// Build a probe for a non-standard port
    pub fn with_port(port: u16, timeout: Duration) -> ReconResult<Self> {
        let provider = Arc::new(ring_provider::default_provider());
        let config = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(|e| ReconError::Tls(e.to_string()))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(InspectOnly { provider }))
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            port,
            timeout,
        })
    }

    async fn handshake(&self, host: &str) -> ReconResult<Vec<u8>> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| ReconError::InvalidHost(host.to_string()))?;

        let stream = TcpStream::connect((host, self.port)).await?;
        let tls = self
            .connector
            .connect(server_name, stream)
            .await
            .map_err(|e| ReconError::Tls(e.to_string()))?;

        let (_, session) = tls.get_ref();
        let leaf = session
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or(ReconError::NoCertificate)?;

        debug!(bytes = leaf.len(), "captured leaf certificate");
        Ok(leaf.as_ref().to_vec())
    }
}

#[async_trait]
impl CertificateProbe for TlsProbe {
    #[instrument(skip(self))]
    async fn leaf_certificate(&self, host: &str) -> ReconResult<Vec<u8>> {
        tokio::time::timeout(self.timeout, self.handshake(host))
            .await
            .map_err(|_| ReconError::Timeout(self.timeout.as_secs()))?
    }
}

/// Accepts any certificate chain but still verifies handshake signatures
#[derive(Debug)]
struct InspectOnly {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for InspectOnly {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
