//! Location Normalizer
//!
//! Standardizes the postal prefix, city and state of a location-bearing row.
//! Pure and idempotent; it never drops a record (incomplete records are
//! filtered by the deduplicator).

use crate::models::{raw::LocationSource, LocationRecord};
use crate::utils::casts::{non_blank, upper_trim};

/// Width of a Brazilian postal-code prefix
pub const POSTAL_PREFIX_WIDTH: usize = 5;

/// Normalize any raw location-bearing row
pub fn normalize<S: LocationSource + ?Sized>(source: &S) -> LocationRecord {
    normalize_fields(source.zip_code_prefix(), source.city(), source.state())
}

/// Normalize loose location fields
pub fn normalize_fields(
    zip_code_prefix: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
) -> LocationRecord {
    LocationRecord {
        postal_prefix: normalize_postal_prefix(zip_code_prefix),
        city_norm: upper_trim(city),
        state_norm: upper_trim(state),
    }
}

/// Keep the prefix as text; restore leading zeros on short all-digit tokens
///
/// Upstream tools that read the prefix as a number turn "01310" into "1310".
/// Anything that is not purely digits is kept verbatim (after trimming).
pub fn normalize_postal_prefix(raw: Option<&str>) -> Option<String> {
    let token = non_blank(raw)?;
    if token.len() < POSTAL_PREFIX_WIDTH && token.bytes().all(|b| b.is_ascii_digit()) {
        Some(format!("{:0>width$}", token, width = POSTAL_PREFIX_WIDTH))
    } else {
        Some(token.to_string())
    }
}
