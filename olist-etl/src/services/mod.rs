//! Pipeline components and the raw CSV loader

pub mod csv_loader;
pub mod fact_assembler;
pub mod location_deduplicator;
pub mod normalizer;
pub mod schema_finalizer;
