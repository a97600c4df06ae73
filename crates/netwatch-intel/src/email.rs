//! Email address risk assessment.

use netwatch_core::score::{email_risk, email_verdict};
use netwatch_core::{EmailCheck, EmailReport, EmailValidators, IntelError, Result};
use netwatch_recon::MxResolver;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, instrument};

const DISPOSABLE_DOMAINS: &[&str] = &[
    "tempmail.com",
    "throwawaymail.com",
    "mailinator.com",
    "guerrillamail.com",
    "yopmail.com",
    "10minutemail.com",
    "sharklasers.com",
    "getnada.com",
    "dispostable.com",
    "grr.la",
];

const ROLE_ACCOUNTS: &[&str] = &["admin", "info", "support", "sales", "contact", "webmaster", "hr"];

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid address pattern"))
}

/// Syntax, disposable-domain, role-account and MX checks
pub struct EmailChecker {
    resolver: Box<dyn MxResolver>,
}

impl EmailChecker {
    pub fn new(resolver: Box<dyn MxResolver>) -> Self {
        Self { resolver }
    }

    /// Assess `email`.
    ///
    /// A syntactically invalid address is a normal answer, not an error.
    /// DNS failures count as "no MX records".
    #[instrument(skip(self))]
    pub async fn check(&self, email: &str) -> Result<EmailCheck> {
        if email.is_empty() {
            return Err(IntelError::invalid("Email is required"));
        }
        let Some((user, domain)) = email
            .split_once('@')
            .filter(|_| address_pattern().is_match(email))
        else {
            return Ok(EmailCheck::invalid_format());
        };

        let mx_records = match self.resolver.mx_records(domain).await {
            Ok(records) => records,
            Err(e) => {
                debug!(domain, error = %e, "MX lookup failed");
                Vec::new()
            }
        };

        let domain_lower = domain.to_lowercase();
        let user_lower = user.to_lowercase();
        let validators = EmailValidators {
            syntax: true,
            mx_records: !mx_records.is_empty(),
            disposable: DISPOSABLE_DOMAINS.contains(&domain_lower.as_str()),
            role_account: ROLE_ACCOUNTS.contains(&user_lower.as_str()),
        };
        let risk_score = email_risk(&validators);

        Ok(EmailCheck::Report(EmailReport {
            valid: validators.mx_records,
            email: email.to_string(),
            domain: domain.to_string(),
            validators,
            mx_records,
            risk_score,
            verdict: email_verdict(risk_score),
        }))
    }
}
