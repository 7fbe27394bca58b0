use chrono::NaiveDate;
use serde::Serialize;

/// Placeholder reported in place of the raw secret bytes.
pub const MASKED_VALUE: &str = "***MASKED***";

/// One detected SAS token occurrence.
///
/// Immutable value record, built from already-fetched secret data and held
/// only for the duration of one scan. The raw token never enters the
/// record: [`Finding::new`] does not accept it, so nothing downstream can
/// leak it into a report or a log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub namespace: String,
    pub secret_name: String,
    pub secret_key: String,
    /// Always [`MASKED_VALUE`]; kept as a field so report rows have a
    /// value column without touching the secret itself.
    pub secret_value: String,
    pub expiration_date: NaiveDate,
    pub remaining_days: i64,
}

impl Finding {
    /// `remaining_days` is derived from `expiration_date` and the
    /// caller-supplied `today`, never set independently.
    pub fn new(
        namespace: impl Into<String>,
        secret_name: impl Into<String>,
        secret_key: impl Into<String>,
        expiration_date: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            secret_name: secret_name.into(),
            secret_key: secret_key.into(),
            secret_value: MASKED_VALUE.to_string(),
            expiration_date,
            remaining_days: expiration_date.signed_duration_since(today).num_days(),
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::from_remaining_days(self.remaining_days)
    }
}

/// Validity bucket for a finding, consumed by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Expired,
    ExpiringSoon,
    Valid,
    ValidLongTerm,
}

impl Severity {
    /// Total over all of `i64`; every count lands in exactly one bucket.
    pub fn from_remaining_days(days: i64) -> Self {
        if days < 0 {
            Severity::Expired
        } else if days < 30 {
            Severity::ExpiringSoon
        } else if days > 365 {
            Severity::ValidLongTerm
        } else {
            Severity::Valid
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Expired => "Expired",
            Severity::ExpiringSoon => "Expiring soon",
            Severity::Valid => "Valid",
            Severity::ValidLongTerm => "Valid for more than a year",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn remaining_days_derived_from_today() {
        let finding = Finding::new(
            "ns",
            "secret",
            "KEY",
            date(2024, 11, 16),
            date(2024, 11, 10),
        );
        assert_eq!(finding.remaining_days, 6);
        assert_eq!(finding.secret_value, MASKED_VALUE);
    }

    #[test]
    fn remaining_days_negative_when_expired() {
        let finding = Finding::new("ns", "secret", "KEY", date(2024, 1, 1), date(2024, 3, 1));
        assert_eq!(finding.remaining_days, -60);
        assert_eq!(finding.severity(), Severity::Expired);
    }

    #[test]
    fn severity_boundaries() {
        assert_eq!(Severity::from_remaining_days(-1), Severity::Expired);
        assert_eq!(Severity::from_remaining_days(0), Severity::ExpiringSoon);
        assert_eq!(Severity::from_remaining_days(29), Severity::ExpiringSoon);
        assert_eq!(Severity::from_remaining_days(30), Severity::Valid);
        assert_eq!(Severity::from_remaining_days(365), Severity::Valid);
        assert_eq!(Severity::from_remaining_days(366), Severity::ValidLongTerm);
    }

    #[test]
    fn severity_extremes() {
        assert_eq!(Severity::from_remaining_days(i64::MIN), Severity::Expired);
        assert_eq!(
            Severity::from_remaining_days(i64::MAX),
            Severity::ValidLongTerm
        );
    }
}
