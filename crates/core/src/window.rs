//! Rule window parsing
//!
//! Windows are written as one or more `<number><unit>` groups, e.g. `"24h"`,
//! `"1h30m"`, `"1.5h"`, `"90s"`. Accepted units: `ns`, `us`/`µs`, `ms`, `s`,
//! `m`, `h`. A bare `"0"` is the empty window. Negative windows are rejected.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Errors from window parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("Invalid duration: {0:?}")]
    Invalid(String),

    #[error("Missing unit in duration: {0:?}")]
    MissingUnit(String),

    #[error("Unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { input: String, unit: String },

    #[error("Duration must not be negative: {0:?}")]
    Negative(String),

    #[error("Duration out of range: {0:?}")]
    Overflow(String),
}

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3_600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Parse a rule window into a non-negative [`Duration`].
///
/// # Example
/// ```
/// use amlwatch_core::parse_window;
/// use chrono::Duration;
///
/// assert_eq!(parse_window("1h30m").unwrap(), Duration::minutes(90));
/// assert!(parse_window("-1h").is_err());
/// assert!(parse_window("ten minutes").is_err());
/// ```
pub fn parse_window(input: &str) -> Result<Duration, WindowError> {
    let invalid = || WindowError::Invalid(input.to_string());

    let mut rest = input;
    let mut negative = false;
    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if rest == "0" {
        return Ok(Duration::zero());
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        // Integer part
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let int_digits = &rest[..int_len];
        rest = &rest[int_len..];

        // Fractional part
        let mut frac_digits = "";
        if let Some(stripped) = rest.strip_prefix('.') {
            let frac_len = stripped
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(stripped.len());
            frac_digits = &stripped[..frac_len];
            rest = &stripped[frac_len..];
        }

        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(invalid());
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        if unit.is_empty() {
            return Err(WindowError::MissingUnit(input.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| WindowError::UnknownUnit {
            input: input.to_string(),
            unit: unit.to_string(),
        })?;

        let overflow = || WindowError::Overflow(input.to_string());

        let whole: u128 = if int_digits.is_empty() {
            0
        } else {
            int_digits.parse().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;

        if !frac_digits.is_empty() {
            // Truncate beyond nanosecond precision of the largest unit
            let digits = &frac_digits[..frac_digits.len().min(18)];
            let numerator: u128 = digits.parse().map_err(|_| overflow())?;
            let denominator = 10u128.pow(digits.len() as u32);
            nanos = nanos
                .checked_add(numerator * scale / denominator)
                .ok_or_else(overflow)?;
        }

        total = total.checked_add(nanos).ok_or_else(overflow)?;
    }

    if negative && total > 0 {
        return Err(WindowError::Negative(input.to_string()));
    }

    let nanos = i64::try_from(total).map_err(|_| WindowError::Overflow(input.to_string()))?;
    Ok(Duration::nanoseconds(nanos))
}

/// True when `timestamp` lies strictly inside `(now - window, now)`.
///
/// Callers capture `now` once per evaluation and pass the same value for
/// every comparison.
#[inline]
pub fn within_window(timestamp: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    timestamp > now - window && timestamp < now
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_units() {
        assert_eq!(parse_window("24h").unwrap(), Duration::hours(24));
        assert_eq!(parse_window("15m").unwrap(), Duration::minutes(15));
        assert_eq!(parse_window("90s").unwrap(), Duration::seconds(90));
        assert_eq!(parse_window("250ms").unwrap(), Duration::milliseconds(250));
        assert_eq!(parse_window("7us").unwrap(), Duration::microseconds(7));
        assert_eq!(parse_window("7µs").unwrap(), Duration::microseconds(7));
        assert_eq!(parse_window("12ns").unwrap(), Duration::nanoseconds(12));
    }

    #[test]
    fn test_parse_compound_and_fractional() {
        assert_eq!(parse_window("1h30m").unwrap(), Duration::minutes(90));
        assert_eq!(parse_window("1.5h").unwrap(), Duration::minutes(90));
        assert_eq!(parse_window(".5s").unwrap(), Duration::milliseconds(500));
        assert_eq!(parse_window("2h45m30s").unwrap(), Duration::seconds(2 * 3600 + 45 * 60 + 30));
    }

    #[test]
    fn test_parse_zero() {
        assert_eq!(parse_window("0").unwrap(), Duration::zero());
        assert_eq!(parse_window("0s").unwrap(), Duration::zero());
        assert_eq!(parse_window("-0").unwrap(), Duration::zero());
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert!(matches!(parse_window("-1h"), Err(WindowError::Negative(_))));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_window(""), Err(WindowError::Invalid(_))));
        assert!(matches!(parse_window("h"), Err(WindowError::Invalid(_))));
        assert!(matches!(parse_window("10"), Err(WindowError::MissingUnit(_))));
        assert!(matches!(parse_window("3d"), Err(WindowError::UnknownUnit { .. })));
        assert!(matches!(parse_window("1 hour"), Err(WindowError::UnknownUnit { .. })));
    }

    #[test]
    fn test_within_window_is_strict() {
        let now = Utc::now();
        let window = Duration::hours(1);

        assert!(within_window(now - Duration::minutes(30), now, window));
        assert!(!within_window(now, now, window));
        assert!(!within_window(now - window, now, window));
        assert!(!within_window(now + Duration::seconds(1), now, window));
    }
}
