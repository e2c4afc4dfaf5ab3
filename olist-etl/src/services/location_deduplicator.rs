//! Location Deduplicator
//!
//! Builds the canonical location dimension from three overlapping sources.
//!
//! **Algorithm:**
//! 1. Normalize customers, sellers and geolocation rows, in that order
//! 2. Drop records with a missing postal prefix, city or state
//! 3. Keep the first occurrence of each (postal_prefix, city, state) triple
//! 4. Assign surrogate ids 1..N in first-seen order
//! 5. Attach the full state name (NULL for unknown codes)
//!
//! Deduplication is exact-match only. A prefix that maps to two different
//! cities yields two rows.

use crate::models::summary::LocationStats;
use crate::models::{
    LocationDimension, LocationDimensionRow, LocationId, LocationRecord, SourceTables,
};
use crate::services::normalizer::normalize;
use tracing::{debug, info};

/// Full name of a Brazilian federative unit by two-letter code
pub fn state_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "AC" => "Acre",
        "AL" => "Alagoas",
        "AP" => "Amapá",
        "AM" => "Amazonas",
        "BA" => "Bahia",
        "CE" => "Ceará",
        "DF" => "Distrito Federal",
        "ES" => "Espírito Santo",
        "GO" => "Goiás",
        "MA" => "Maranhão",
        "MT" => "Mato Grosso",
        "MS" => "Mato Grosso do Sul",
        "MG" => "Minas Gerais",
        "PA" => "Pará",
        "PB" => "Paraíba",
        "PR" => "Paraná",
        "PE" => "Pernambuco",
        "PI" => "Piauí",
        "RJ" => "Rio de Janeiro",
        "RN" => "Rio Grande do Norte",
        "RS" => "Rio Grande do Sul",
        "RO" => "Rondônia",
        "RR" => "Roraima",
        "SC" => "Santa Catarina",
        "SP" => "São Paulo",
        "SE" => "Sergipe",
        "TO" => "Tocantins",
        _ => return None,
    };
    Some(name)
}

/// Incremental builder for the location dimension
#[derive(Debug, Default)]
pub struct LocationDeduplicator {
    dimension: LocationDimension,
    stats: LocationStats,
}

impl LocationDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer one normalized record
    pub fn push(&mut self, record: &LocationRecord) {
        self.stats.records_seen += 1;

        let Some(key) = record.key() else {
            self.stats.records_incomplete += 1;
            return;
        };

        let next_id = LocationId(self.dimension.len() as i64 + 1);
        let state_name = state_name(&key.state_norm);
        let inserted = self.dimension.insert(LocationDimensionRow {
            location_id: next_id,
            key,
            state_name,
        });

        if inserted && state_name.is_none() {
            self.stats.unknown_states += 1;
            debug!("No state name for location {}", next_id);
        }
    }

    /// Offer a batch of normalized records
    pub fn extend<'a>(&mut self, records: impl IntoIterator<Item = &'a LocationRecord>) {
        for record in records {
            self.push(record);
        }
    }

    /// Finished dimension and its statistics
    pub fn finish(mut self) -> (LocationDimension, LocationStats) {
        self.stats.rows_kept = self.dimension.len();
        (self.dimension, self.stats)
    }
}

/// Build `dim_locations` from the customer, seller and geolocation tables
pub fn build_location_dimension(sources: &SourceTables) -> (LocationDimension, LocationStats) {
    let mut dedup = LocationDeduplicator::new();

    let customers: Vec<LocationRecord> = sources.customers.iter().map(normalize).collect();
    let sellers: Vec<LocationRecord> = sources.sellers.iter().map(normalize).collect();
    let geolocation: Vec<LocationRecord> = sources.geolocation.iter().map(normalize).collect();

    dedup.extend(&customers);
    dedup.extend(&sellers);
    dedup.extend(&geolocation);

    let (dimension, stats) = dedup.finish();
    info!("Location dimension: {}", stats.display_string());
    (dimension, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawCustomer, RawGeolocation, RawSeller};
    use std::collections::HashSet;

    fn customer(zip: &str, city: &str, state: &str) -> RawCustomer {
        RawCustomer {
            customer_id: Some(format!("c-{}", zip)),
            customer_zip_code_prefix: Some(zip.to_string()),
            customer_city: Some(city.to_string()),
            customer_state: Some(state.to_string()),
        }
    }

    fn geo(zip: &str, city: &str, state: &str) -> RawGeolocation {
        RawGeolocation {
            geolocation_zip_code_prefix: Some(zip.to_string()),
            geolocation_city: Some(city.to_string()),
            geolocation_state: Some(state.to_string()),
        }
    }

    #[test]
    fn test_all_27_units_are_mapped() {
        let codes = [
            "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA",
            "PB", "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
        ];
        assert_eq!(codes.iter().filter_map(|c| state_name(c)).count(), 27);
        assert_eq!(state_name("XX"), None);
        assert_eq!(state_name("sp"), None);
    }

    #[test]
    fn test_casing_variants_collapse_to_one_row() {
        let sources = SourceTables {
            customers: vec![customer("01310", "Sao Paulo", "sp")],
            geolocation: vec![geo("01310", "SAO PAULO", "SP")],
            ..Default::default()
        };

        let (dimension, stats) = build_location_dimension(&sources);
        assert_eq!(dimension.len(), 1);
        assert_eq!(stats.records_seen, 2);

        let row = &dimension.rows()[0];
        assert_eq!(row.location_id, LocationId(1));
        assert_eq!(row.key.city_norm, "SAO PAULO");
        assert_eq!(row.state_name, Some("São Paulo"));
    }

    #[test]
    fn test_conflicting_cities_both_survive() {
        let sources = SourceTables {
            customers: vec![customer("13000", "Campinas", "SP")],
            sellers: vec![RawSeller {
                seller_id: Some("s1".to_string()),
                seller_zip_code_prefix: Some("13000".to_string()),
                seller_city: Some("Valinhos".to_string()),
                seller_state: Some("SP".to_string()),
            }],
            ..Default::default()
        };

        let (dimension, _) = build_location_dimension(&sources);
        assert_eq!(dimension.len(), 2);
    }

    #[test]
    fn test_incomplete_and_unknown_state() {
        let sources = SourceTables {
            geolocation: vec![
                geo("01310", "", "SP"),
                geo("99999", "Nowhere", "ZZ"),
                geo("99999", "nowhere", "zz"),
            ],
            ..Default::default()
        };

        let (dimension, stats) = build_location_dimension(&sources);
        assert_eq!(stats.records_incomplete, 1);
        assert_eq!(stats.unknown_states, 1);
        assert_eq!(dimension.len(), 1);
        assert_eq!(dimension.rows()[0].state_name, None);
    }

    #[test]
    fn test_keys_and_ids_are_unique() {
        let geolocation: Vec<RawGeolocation> = (0..200)
            .map(|i| geo(&format!("{}", i % 37), &format!("City {}", i % 5), "mg"))
            .collect();
        let sources = SourceTables {
            geolocation,
            ..Default::default()
        };

        let (dimension, _) = build_location_dimension(&sources);
        let keys: HashSet<_> = dimension.rows().iter().map(|r| r.key.clone()).collect();
        let ids: HashSet<_> = dimension.rows().iter().map(|r| r.location_id).collect();
        assert_eq!(keys.len(), dimension.len());
        assert_eq!(ids.len(), dimension.len());
    }
}
