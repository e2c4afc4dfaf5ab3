//! Location records and the canonical location dimension

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Surrogate key of a `dim_locations` row (unique within one run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LocationId(pub i64);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized location fields of one source row
///
/// A field is `None` when the raw value was missing or blank after trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LocationRecord {
    pub postal_prefix: Option<String>,
    pub city_norm: Option<String>,
    pub state_norm: Option<String>,
}

impl LocationRecord {
    /// Composite key, if every component is present
    pub fn key(&self) -> Option<LocationKey> {
        Some(LocationKey {
            postal_prefix: self.postal_prefix.clone()?,
            city_norm: self.city_norm.clone()?,
            state_norm: self.state_norm.clone()?,
        })
    }
}

/// Complete (postal_prefix, city_norm, state_norm) triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationKey {
    pub postal_prefix: String,
    pub city_norm: String,
    pub state_norm: String,
}

/// One row of `dim_locations`
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDimensionRow {
    pub location_id: LocationId,
    pub key: LocationKey,
    pub state_name: Option<&'static str>,
}

/// Canonical location dimension with an exact-match lookup on the key triple
#[derive(Debug, Clone, Default)]
pub struct LocationDimension {
    rows: Vec<LocationDimensionRow>,
    index: HashMap<LocationKey, LocationId>,
}

impl LocationDimension {
    /// Empty dimension
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row under a fresh key
    ///
    /// Returns `false` (and leaves the dimension unchanged) if the key is
    /// already present, which keeps the key triple unique.
    pub fn insert(&mut self, row: LocationDimensionRow) -> bool {
        if self.index.contains_key(&row.key) {
            return false;
        }
        self.index.insert(row.key.clone(), row.location_id);
        self.rows.push(row);
        true
    }

    /// Rows in surrogate-key assignment order
    pub fn rows(&self) -> &[LocationDimensionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Best-effort resolution: `None` when any component is missing or no
    /// canonical row carries the same triple
    pub fn resolve(&self, record: &LocationRecord) -> Option<LocationId> {
        let key = record.key()?;
        self.index.get(&key).copied()
    }
}
