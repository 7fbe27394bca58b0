use chrono::NaiveDate;

/// Values at or below this length are never treated as SAS candidates.
/// A real token carries several query parameters plus a signature and
/// comfortably exceeds it.
const MIN_TOKEN_LEN: usize = 120;

const EXPIRY_MARKER: &str = "se=";

/// Layouts tried, in order, against the 10-character window after `se=`.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("missing 'se=' expiry parameter")]
    MissingExpiryMarker,
    #[error("expiry date truncated after 'se='")]
    TruncatedDate,
    #[error("unrecognized expiry date format: {0}")]
    InvalidDateFormat(String),
    #[error("value is not valid UTF-8")]
    InvalidUtf8,
}

/// Cheap structural check for "probably a SAS token".
///
/// Deliberately a heuristic, not a validator: false positives are caught
/// downstream when [`parse_expiration`] rejects them, and tokens shorter
/// than the length floor are an accepted miss.
pub fn is_candidate_token(value: &[u8]) -> bool {
    value.len() > MIN_TOKEN_LEN
        && value
            .windows(EXPIRY_MARKER.len())
            .any(|w| w == EXPIRY_MARKER.as_bytes())
}

/// Extract the expiry date embedded in a SAS token.
///
/// Only the first 10 bytes after the first `se=` are read, which assumes
/// the `YYYY-MM-DD` prefix precedes any further query-string encoding.
/// A percent-encoded expiry value that shifts the date out of that window
/// is rejected as unparseable rather than silently mis-parsed.
pub fn parse_expiration(token: &str) -> Result<NaiveDate, TokenError> {
    let start = token
        .find(EXPIRY_MARKER)
        .ok_or(TokenError::MissingExpiryMarker)?
        + EXPIRY_MARKER.len();
    let rest = &token[start..];

    // `get` also fails when byte 10 is not a char boundary, which for a
    // date window is just another form of truncation.
    let date_str = rest.get(..10).ok_or(TokenError::TruncatedDate)?;

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, format) {
            return Ok(date);
        }
    }
    Err(TokenError::InvalidDateFormat(date_str.to_string()))
}
