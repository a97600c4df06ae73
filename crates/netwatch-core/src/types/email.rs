use serde::{Deserialize, Serialize};

/// Mail exchanger for a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxRecord {
    /// Exchange host name
    pub exchange: String,
    /// Preference (lower is preferred)
    pub priority: u16,
}

/// Outcome of each individual email check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailValidators {
    /// Address is syntactically valid
    pub syntax: bool,
    /// Domain publishes at least one MX record
    pub mx_records: bool,
    /// Domain is a known disposable-mail provider
    pub disposable: bool,
    /// Local part is a role account (admin, info, ...)
    pub role_account: bool,
}

/// Email risk verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmailVerdict {
    /// Score above 50
    #[serde(rename = "High Risk")]
    HighRisk,
    /// Score above 10
    Moderate,
    /// Anything else
    Clean,
}

/// Full email assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailReport {
    /// Domain can receive mail
    pub valid: bool,
    /// Address as submitted
    pub email: String,
    /// Domain part
    pub domain: String,
    /// Per-check breakdown
    pub validators: EmailValidators,
    /// MX records, lowest preference first
    pub mx_records: Vec<MxRecord>,
    /// Additive risk score; not clamped
    pub risk_score: u32,
    /// Verdict derived from the score
    pub verdict: EmailVerdict,
}

/// Syntax-only failure details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxDetails {
    /// Always false
    pub syntax: bool,
}

/// Email check response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmailCheck {
    /// The address passed syntax validation and was assessed
    Report(EmailReport),
    /// The address is not syntactically valid
    Invalid {
        /// Always false
        valid: bool,
        /// Why the address was rejected
        reason: String,
        /// Check breakdown
        details: SyntaxDetails,
    },
}

impl EmailCheck {
    /// Response for an address that failed syntax validation
    #[must_use]
    pub fn invalid_format() -> Self {
        Self::Invalid {
            valid: false,
            reason: "Invalid format".to_string(),
            details: SyntaxDetails { syntax: false },
        }
    }
}
