//! Test Helper Utilities
//!
//! Shared utilities for the olist-etl integration tests
#![allow(dead_code)]

pub mod db_utils;
pub mod fixtures;

// Re-export commonly used items
pub use db_utils::{
    count_rows, create_raw_tables, create_test_db, duplicate_keys, insert_rows, test_config,
};
pub use fixtures::{seed_scenario, write_scenario_csvs};
