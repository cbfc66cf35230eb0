//! Relative age strings such as `7d`, `24h` or `30m`

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ValidationError;

static AGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)([dhm])$").unwrap());

const AGE_HINT: &str = "use '7d', '24h', or '30m'";

/// Parse an age string into a duration. One unit only, no signs or decimals.
pub fn parse_age(text: &str) -> Result<Duration, ValidationError> {
    let invalid = || ValidationError::invalid("older_than", text, AGE_HINT);

    let captures = AGE.captures(text).ok_or_else(invalid)?;
    let value: i64 = captures[1].parse().map_err(|_| invalid())?;

    let duration = match &captures[2] {
        "d" => Duration::try_days(value),
        "h" => Duration::try_hours(value),
        "m" => Duration::try_minutes(value),
        _ => None,
    };
    duration.ok_or_else(invalid)
}

/// The instant before which a session counts as older than `age`.
pub fn cutoff(now: DateTime<Utc>, age: Duration) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(age)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_age("7d"), Ok(Duration::days(7)));
        assert_eq!(parse_age("24h"), Ok(Duration::hours(24)));
        assert_eq!(parse_age("30m"), Ok(Duration::minutes(30)));
        assert_eq!(parse_age("0m"), Ok(Duration::zero()));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "d", "7", "7x", "1.5h", "-3d", "7d12h", " 7d", "7D", "7dd"] {
            assert!(parse_age(bad).is_err(), "expected rejection for {bad:?}");
        }
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert!(parse_age("99999999999999999999d").is_err());
        assert!(parse_age("9999999999999d").is_err());
    }

    #[test]
    fn test_cutoff() {
        let now = Utc::now();
        assert_eq!(cutoff(now, Duration::days(7)), Some(now - Duration::days(7)));
    }
}
