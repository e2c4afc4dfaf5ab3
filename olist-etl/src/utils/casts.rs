//! Text-to-typed casts for raw source values
//!
//! All casts treat a missing or blank value as NULL. A non-blank value that
//! does not parse is an error; callers decide whether that aborts the run.

use chrono::{NaiveDate, NaiveDateTime, SubsecRound};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Fractional digits kept for money columns
pub const MONEY_SCALE: u32 = 2;

/// Seconds in a day, for duration-to-days conversion
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Timestamp layouts accepted in source data, tried in order
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Layout used when writing timestamps back to SQLite
pub const TIMESTAMP_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Trimmed value, or `None` if missing or blank
pub fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// `LOWER(TRIM(value))`, blank as NULL
pub fn lower_trim(raw: Option<&str>) -> Option<String> {
    non_blank(raw).map(str::to_lowercase)
}

/// `UPPER(TRIM(value))`, blank as NULL
pub fn upper_trim(raw: Option<&str>) -> Option<String> {
    non_blank(raw).map(str::to_uppercase)
}

/// Parse a timestamp; a bare date means midnight
///
/// Fractional seconds are truncated: values are stored to the second, and
/// KPIs must be computed from exactly what is stored.
pub fn parse_timestamp(raw: Option<&str>) -> Result<Option<NaiveDateTime>, String> {
    let Some(text) = non_blank(raw) else {
        return Ok(None);
    };

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Some(ts.trunc_subsecs(0)));
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(Some)
        .ok_or_else(|| format!("invalid timestamp '{}'", text))
}

/// Parse a money amount, rounded to two fractional digits (half away from zero)
pub fn parse_money(raw: Option<&str>) -> Result<Option<Decimal>, String> {
    let Some(text) = non_blank(raw) else {
        return Ok(None);
    };

    let value = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| format!("invalid decimal '{}'", text))?;

    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    Ok(Some(rounded))
}

/// Parse an integer; decimal text with a zero fraction ("3.0") is accepted
pub fn parse_integer(raw: Option<&str>) -> Result<Option<i64>, String> {
    let Some(text) = non_blank(raw) else {
        return Ok(None);
    };

    if let Ok(value) = text.parse::<i64>() {
        return Ok(Some(value));
    }

    Decimal::from_str(text)
        .ok()
        .filter(|d| d.fract().is_zero())
        .and_then(|d| i64::try_from(d).ok())
        .map(Some)
        .ok_or_else(|| format!("invalid integer '{}'", text))
}

/// Parse a finite real number
pub fn parse_real(raw: Option<&str>) -> Result<Option<f64>, String> {
    let Some(text) = non_blank(raw) else {
        return Ok(None);
    };

    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| format!("invalid number '{}'", text))
}

/// `later - earlier` in fractional days, NULL if either side is NULL
pub fn days_between(later: Option<NaiveDateTime>, earlier: Option<NaiveDateTime>) -> Option<f64> {
    let delta = later? - earlier?;
    // Millisecond resolution
    Some(delta.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY)
}

/// Render a timestamp the way SQLite date functions expect
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_OUTPUT_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_blank_is_null() {
        assert_eq!(parse_timestamp(Some("   ")).unwrap(), None);
        assert_eq!(parse_money(None).unwrap(), None);
        assert_eq!(parse_integer(Some("")).unwrap(), None);
        assert_eq!(lower_trim(Some("  ")), None);
    }

    #[test]
    fn test_timestamp_layouts() {
        let expected = ts("2024-01-05 10:30:00");
        assert_eq!(parse_timestamp(Some("2024-01-05 10:30:00")).unwrap(), Some(expected));
        assert_eq!(parse_timestamp(Some("2024-01-05T10:30:00")).unwrap(), Some(expected));
        assert_eq!(parse_timestamp(Some(" 2024-01-05 10:30 ")).unwrap(), Some(expected));
        assert_eq!(
            parse_timestamp(Some("2024-01-05")).unwrap(),
            Some(ts("2024-01-05 00:00:00"))
        );
        assert!(parse_timestamp(Some("05/01/2024")).is_err());
    }

    #[test]
    fn test_fractional_seconds_truncate() {
        let parsed = parse_timestamp(Some("2024-02-10 00:00:00.999")).unwrap().unwrap();
        assert_eq!(parsed, ts("2024-02-10 00:00:00"));
        assert_eq!(format_timestamp(&parsed), "2024-02-10 00:00:00");

        // Stored value and day difference agree
        let estimated = ts("2024-02-10 00:00:00");
        assert_eq!(days_between(Some(parsed), Some(estimated)), Some(0.0));
    }

    #[test]
    fn test_money_rounds_half_away_from_zero() {
        assert_eq!(parse_money(Some("10.005")).unwrap(), Some(Decimal::new(1001, 2)));
        assert_eq!(parse_money(Some("-10.005")).unwrap(), Some(Decimal::new(-1001, 2)));
        assert_eq!(parse_money(Some("29.9")).unwrap(), Some(Decimal::new(2990, 2)));
        assert_eq!(parse_money(Some("29.9")).unwrap().unwrap().to_string(), "29.90");
        assert!(parse_money(Some("12,50")).is_err());
    }

    #[test]
    fn test_integer_accepts_whole_decimals() {
        assert_eq!(parse_integer(Some("3")).unwrap(), Some(3));
        assert_eq!(parse_integer(Some("3.0")).unwrap(), Some(3));
        assert!(parse_integer(Some("3.5")).is_err());
        assert!(parse_integer(Some("three")).is_err());
    }

    #[test]
    fn test_real_rejects_non_finite() {
        assert_eq!(parse_real(Some("4")).unwrap(), Some(4.0));
        assert!(parse_real(Some("NaN")).is_err());
    }

    #[test]
    fn test_days_between() {
        let purchase = Some(ts("2024-01-01 00:00:00"));
        let delivered = Some(ts("2024-01-05 12:00:00"));
        assert_eq!(days_between(delivered, purchase), Some(4.5));
        assert_eq!(days_between(purchase, delivered), Some(-4.5));
        assert_eq!(days_between(None, purchase), None);
        assert_eq!(days_between(delivered, None), None);
    }

    #[test]
    fn test_case_normalizers() {
        assert_eq!(upper_trim(Some(" Sao Paulo ")), Some("SAO PAULO".to_string()));
        assert_eq!(lower_trim(Some(" Delivered")), Some("delivered".to_string()));
    }
}
