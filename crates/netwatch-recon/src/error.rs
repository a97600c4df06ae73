use netwatch_core::SourceError;
use thiserror::Error;

/// Result type alias for probe operations
pub type ReconResult<T> = std::result::Result<T, ReconError>;

/// Errors from DNS and TLS probes
#[derive(Error, Debug)]
pub enum ReconError {
    /// DNS resolution error
    #[error("DNS error: {0}")]
    Dns(String),

    /// TLS handshake failure
    #[error("TLS handshake failed: {0}")]
    Tls(String),

    /// The server completed the handshake without presenting a certificate
    #[error("no certificate found")]
    NoCertificate,

    /// Certificate could not be decoded
    #[error("certificate parse error: {0}")]
    Certificate(String),

    /// Host name is not usable as a TLS server name
    #[error("invalid host name: {0}")]
    InvalidHost(String),

    /// Network I/O error
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// Timeout
    #[error("operation timed out after {0}s")]
    Timeout(u64),
}

impl From<ReconError> for SourceError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::Certificate(reason) => Self::malformed("tls", reason),
            other => Self::unavailable("tls", other.to_string()),
        }
    }
}
