//! Network probes used by netwatch lookups that are not plain HTTP calls.
//!
//! - [`dns`]: MX record resolution through hickory
//! - [`tls`]: TLS handshakes that capture the server's leaf certificate
//! - [`certificate`]: X.509 parsing into a [`netwatch_core::CertificateReport`]
//!
//! Both probes sit behind small traits so lookup services can be tested
//! without touching the network.

mod error;

pub mod certificate;
pub mod dns;
pub mod tls;

pub use certificate::inspect_certificate;
pub use dns::{DnsResolver, MxResolver};
pub use error::{ReconError, ReconResult};
pub use tls::{CertificateProbe, TlsProbe};
