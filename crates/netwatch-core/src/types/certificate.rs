use serde::{Deserialize, Serialize};

/// Leaf certificate details for a TLS endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateReport {
    /// Subject distinguished name
    pub subject: String,

    /// Issuer distinguished name
    pub issuer: String,

    /// Start of validity (RFC 3339)
    pub valid_from: String,

    /// End of validity (RFC 3339)
    pub valid_to: String,

    /// Whole days between now and expiry, rounded up
    pub days_remaining: i64,

    /// Now falls inside the validity window
    pub valid: bool,

    /// Serial number, colon-separated hex
    #[serde(rename = "serialNumber")]
    pub serial_number: String,

    /// SHA-1 fingerprint, colon-separated uppercase hex
    pub fingerprint: String,

    /// SHA-256 fingerprint, colon-separated uppercase hex
    pub fingerprint256: String,
}
