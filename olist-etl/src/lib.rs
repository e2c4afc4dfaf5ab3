//! olist-etl library interface
//!
//! Builds the analytics tables of the Olist e-commerce dataset:
//! - `dim_locations`: canonical (postal prefix, city, state) dimension
//! - `master_table`: one row per order item with payment, review and
//!   delivery KPIs
//!
//! The binary drives [`workflow::run_load`] and [`workflow::run_transform`];
//! integration tests use the same entry points.

pub mod db;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

pub use models::RunSummary;
pub use workflow::{run_all, run_load, run_transform};

/// Version, commit, build time and profile of this build
pub fn build_info() -> String {
    format!(
        "{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_identifies_binary() {
        let info = build_info();
        assert!(info.starts_with(env!("CARGO_PKG_VERSION")), "{}", info);
        assert!(!env!("GIT_HASH").is_empty());
        assert!(info.ends_with(&format!("({})", env!("BUILD_PROFILE"))), "{}", info);
    }
}
