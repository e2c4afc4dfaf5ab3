//! Run statistics reported by the loader and the transform

use serde::Serialize;
use std::collections::BTreeMap;

/// Location dimension build statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationStats {
    /// Normalized records across customers, sellers and geolocation
    pub records_seen: usize,
    /// Records dropped for a missing key component
    pub records_incomplete: usize,
    /// Unique rows published to dim_locations
    pub rows_kept: usize,
    /// Rows whose state code has no full name
    pub unknown_states: usize,
}

impl LocationStats {
    pub fn display_string(&self) -> String {
        format!(
            "{} records, {} incomplete, {} unique locations ({} unknown states)",
            self.records_seen, self.records_incomplete, self.rows_kept, self.unknown_states
        )
    }
}

/// Fact assembly statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FactStats {
    /// Fact rows produced (one per order item)
    pub rows: usize,
    /// Order items dropped because their order does not exist
    pub items_without_order: usize,
    /// Fact rows with no resolved customer location
    pub unresolved_customer_locations: usize,
    /// Fact rows with no resolved seller location
    pub unresolved_seller_locations: usize,
    /// Malformed timestamps coerced to NULL
    pub timestamps_nulled: usize,
    /// Identical repeated lookup rows that were dropped
    pub duplicate_lookup_keys: usize,
}

impl FactStats {
    pub fn display_string(&self) -> String {
        format!(
            "{} fact rows, {} orphan items, {} nulled timestamps",
            self.rows, self.items_without_order, self.timestamps_nulled
        )
    }
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Rows loaded from CSV per raw table (empty when the load step did not run)
    pub loaded_rows: BTreeMap<String, usize>,
    /// Rows read per source table by the transform
    pub source_rows: BTreeMap<String, usize>,
    pub locations: LocationStats,
    pub facts: FactStats,
    pub elapsed_ms: u128,
}
