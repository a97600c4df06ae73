//! X.509 leaf certificate inspection.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use netwatch_core::CertificateReport;
use ring::digest::{digest, Algorithm, SHA1_FOR_LEGACY_USE_ONLY, SHA256};
use x509_parser::time::ASN1Time;

use crate::error::{ReconError, ReconResult};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Summarize a DER-encoded certificate as seen at `now`.
///
/// `days_remaining` is the absolute distance to expiry in days, rounded up,
/// so it stays positive for expired certificates; check `valid` for that.
pub fn inspect_certificate(der: &[u8], now: DateTime<Utc>) -> ReconResult<CertificateReport> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| ReconError::Certificate(e.to_string()))?;

    let not_before = asn1_to_utc(cert.validity().not_before)?;
    let not_after = asn1_to_utc(cert.validity().not_after)?;

    let remaining_ms = (not_after - now).num_milliseconds().abs();
    let days_remaining = (remaining_ms + DAY_MS - 1) / DAY_MS;

    Ok(CertificateReport {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        valid_from: not_before.to_rfc3339_opts(SecondsFormat::Secs, true),
        valid_to: not_after.to_rfc3339_opts(SecondsFormat::Secs, true),
        days_remaining,
        valid: not_before < now && now < not_after,
        serial_number: cert.raw_serial_as_string(),
        fingerprint: fingerprint(&SHA1_FOR_LEGACY_USE_ONLY, der),
        fingerprint256: fingerprint(&SHA256, der),
    })
}

/// Colon-separated uppercase hex digest
fn fingerprint(algorithm: &'static Algorithm, der: &[u8]) -> String {
    digest(algorithm, der)
        .as_ref()
        .iter()
        .map(|byte| hex::encode_upper([*byte]))
        .collect::<Vec<_>>()
        .join(":")
}

fn asn1_to_utc(time: ASN1Time) -> ReconResult<DateTime<Utc>> {
    Utc.timestamp_opt(time.timestamp(), 0)
        .single()
        .ok_or_else(|| ReconError::Certificate(format!("validity out of range: {time}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use x509_parser::pem::parse_x509_pem;

    // Self-signed P-256 certificate, serial 0x1234.
    const FIXTURE: &str = "-----BEGIN CERTIFICATE-----
MIIBqzCCAVGgAwIBAgICEjQwCgYIKoZIzj0EAwIwNDEWMBQGA1UEAwwNbmV0d2F0
Y2gudGVzdDEaMBgGA1UECgwRTmV0d2F0Y2ggRml4dHVyZXMwHhcNMjYxMDE5MTk0
NTU1WhcNMzYxMDE2MTk0NTU1WjA0MRYwFAYDVQQDDA1uZXR3YXRjaC50ZXN0MRow
GAYDVQQKDBFOZXR3YXRjaCBGaXh0dXJlczBZMBMGByqGSM49AgEGCCqGSM49AwEH
A0IABMWmta++LrajEqSXIwNePdAn8nC6PrxS6+OK9XnR3CPA7be1HL1pmOWJwlqr
E/QJ65C6LXolEU89JfwRI8YhWZyjUzBRMB0GA1UdDgQWBBQeJ84A7dxSseyKYxzz
zLhVV9DoJjAfBgNVHSMEGDAWgBQeJ84A7dxSseyKYxzzzLhVV9DoJjAPBgNVHRMB
Af8EBTADAQH/MAoGCCqGSM49BAMCA0gAMEUCIDcPbFM/mdAdsmApYm4bx4bhoHoi
NA5wewxf/RFSgwTnAiEA4R0fi4x+GrxoDjyz2DPuqfglXt/nvWGhoZ9wzbVeGP8=
-----END CERTIFICATE-----
";

    fn fixture_der() -> Vec<u8> {
        let (_, pem) = parse_x509_pem(FIXTURE.as_bytes()).unwrap();
        pem.contents
    }

    #[test]
    fn inspects_fixture_inside_validity_window() {
        let now = Utc.with_ymd_and_hms(2027, 10, 19, 19, 45, 55).unwrap();
        let report = inspect_certificate(&fixture_der(), now).unwrap();

        assert!(report.subject.contains("CN=netwatch.test"));
        assert_eq!(report.subject, report.issuer);
        assert_eq!(report.valid_from, "2026-10-19T19:45:55Z");
        assert_eq!(report.valid_to, "2036-10-16T19:45:55Z");
        assert!(report.valid);
        assert_eq!(report.days_remaining, 3285);
        assert_eq!(report.serial_number, "12:34");
        assert_eq!(
            report.fingerprint256,
            "8F:8C:62:64:32:DA:32:92:23:75:EB:5D:59:94:7A:74:D2:61:1A:25:CF:3C:C1:86:11:9D:A1:2F:26:DD:77:C6"
        );
        assert_eq!(
            report.fingerprint,
            "E7:40:BB:16:1C:3B:40:77:F7:C1:2D:8E:47:FF:62:58:B5:65:36:96"
        );
    }

    #[test]
    fn expired_certificate_is_invalid_with_positive_days() {
        let now = Utc.with_ymd_and_hms(2036, 10, 18, 7, 45, 55).unwrap();
        let report = inspect_certificate(&fixture_der(), now).unwrap();
        assert!(!report.valid);
        // 1.5 days past expiry rounds up to 2
        assert_eq!(report.days_remaining, 2);
    }

    #[test]
    fn not_yet_valid_certificate_is_invalid() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert!(!inspect_certificate(&fixture_der(), now).unwrap().valid);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = inspect_certificate(b"not a certificate", Utc::now()).unwrap_err();
        assert!(matches!(err, ReconError::Certificate(_)));
    }
}
