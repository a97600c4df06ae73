//! Score and verdict derivation.
//!
//! Every rule here is a pure function of its inputs so lookups stay
//! deterministic for identical provider data.

use chrono::{DateTime, Utc};

use crate::time::parse_date;
use crate::types::{EmailValidators, EmailVerdict, FeedItem, Severity, ThreatLevel, UNKNOWN};

/// Points per feed mention
const POINTS_PER_MATCH: usize = 25;

/// Floor applied when any mention is critical
const CRITICAL_FLOOR: u8 = 75;

/// Email score contributions
const DISPOSABLE_POINTS: u32 = 90;
const NO_MX_POINTS: u32 = 80;
const ROLE_ACCOUNT_POINTS: u32 = 10;

/// Abuse confidence above which an address is tagged high risk
pub const HIGH_RISK_ABUSE_SCORE: u8 = 50;

/// Clamp any integer into the 0-100 score range
#[must_use]
pub fn clamp_score(value: i64) -> u8 {
    u8::try_from(value.clamp(0, 100)).unwrap_or(100)
}

/// Derive a domain's reputation from the feed items that mention it.
///
/// Score is 25 points per match capped at 100, raised to 75 when any match
/// is critical. Level: no matches is Clean, any critical is Critical, more
/// than two matches is High, otherwise Medium.
#[must_use]
pub fn domain_reputation(matches: &[FeedItem]) -> (u8, ThreatLevel) {
    if matches.is_empty() {
        return (0, ThreatLevel::Clean);
    }

    let raw = matches.len().saturating_mul(POINTS_PER_MATCH).min(100);
    let mut score = u8::try_from(raw).unwrap_or(100);

    let level = if matches.iter().any(|m| m.severity == Severity::Critical) {
        score = score.max(CRITICAL_FLOOR);
        ThreatLevel::Critical
    } else if matches.len() > 2 {
        ThreatLevel::High
    } else {
        ThreatLevel::Medium
    };

    (score, level)
}

/// Additive email risk score.
///
/// The sum is deliberately not clamped: a disposable role account on a
/// domain without MX records scores 180.
#[must_use]
pub const fn email_risk(validators: &EmailValidators) -> u32 {
    let mut score = 0;
    if validators.disposable {
        score += DISPOSABLE_POINTS;
    }
    if !validators.mx_records {
        score += NO_MX_POINTS;
    }
    if validators.role_account {
        score += ROLE_ACCOUNT_POINTS;
    }
    score
}

/// Map an email risk score to a verdict
#[must_use]
pub const fn email_verdict(score: u32) -> EmailVerdict {
    if score > 50 {
        EmailVerdict::HighRisk
    } else if score > 10 {
        EmailVerdict::Moderate
    } else {
        EmailVerdict::Clean
    }
}

/// Elapsed time since registration rendered as `"{years}y {months}m"`.
///
/// Years count 365.25-day periods; months count 30-day periods modulo 12.
/// Returns "Unknown" when the date cannot be parsed.
#[must_use]
pub fn domain_age(created: &str, now: DateTime<Utc>) -> String {
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    const YEAR_MS: f64 = 365.25 * 24.0 * 60.0 * 60.0 * 1000.0;

    let Some(created) = parse_date(created) else {
        return UNKNOWN.to_string();
    };

    let elapsed = now.signed_duration_since(created).num_milliseconds();
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let years = (elapsed as f64 / YEAR_MS).floor() as i64;
    let months = elapsed.div_euclid(30 * DAY_MS) % 12;

    format!("{years}y {months}m")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn feed(severity: Severity) -> FeedItem {
        FeedItem {
            id: "x".into(),
            title: "t".into(),
            category: "Malware".into(),
            date: "2024-01-01".into(),
            severity,
            description: String::new(),
            tags: vec![],
            source: "URLHaus".into(),
            iocs: None,
        }
    }

    #[test]
    fn no_matches_is_clean() {
        assert_eq!(domain_reputation(&[]), (0, ThreatLevel::Clean));
    }

    #[test]
    fn three_high_matches() {
        let matches = vec![feed(Severity::High); 3];
        assert_eq!(domain_reputation(&matches), (75, ThreatLevel::High));
    }

    #[test]
    fn single_critical_match_raised_to_floor() {
        let matches = vec![feed(Severity::Critical)];
        assert_eq!(domain_reputation(&matches), (75, ThreatLevel::Critical));
    }

    #[test]
    fn two_matches_are_medium() {
        let matches = vec![feed(Severity::High), feed(Severity::Medium)];
        assert_eq!(domain_reputation(&matches), (50, ThreatLevel::Medium));
    }

    #[test]
    fn score_caps_at_hundred() {
        let matches = vec![feed(Severity::Critical); 7];
        assert_eq!(domain_reputation(&matches), (100, ThreatLevel::Critical));
    }

    #[test]
    fn email_score_is_unclamped() {
        let validators = EmailValidators {
            syntax: true,
            mx_records: false,
            disposable: true,
            role_account: true,
        };
        let score = email_risk(&validators);
        assert_eq!(score, 180);
        assert_eq!(email_verdict(score), EmailVerdict::HighRisk);
    }

    #[test]
    fn email_verdict_thresholds() {
        assert_eq!(email_verdict(0), EmailVerdict::Clean);
        assert_eq!(email_verdict(10), EmailVerdict::Clean);
        assert_eq!(email_verdict(11), EmailVerdict::Moderate);
        assert_eq!(email_verdict(50), EmailVerdict::Moderate);
        assert_eq!(email_verdict(51), EmailVerdict::HighRisk);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp_score(-5), 0);
        assert_eq!(clamp_score(42), 42);
        assert_eq!(clamp_score(250), 100);
    }

    #[test]
    fn domain_age_years_and_months() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        // 3652 days: 9 full 365.25-day years, 121 thirty-day periods.
        assert_eq!(domain_age("2014-06-02", now), "9y 1m");
        assert_eq!(domain_age("2024-05-01", now), "0y 1m");
    }

    #[test]
    fn domain_age_unknown_on_garbage() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(domain_age("Unknown", now), "Unknown");
        assert_eq!(domain_age("yesterday", now), "Unknown");
    }
}
