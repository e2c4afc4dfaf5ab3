//! Reads of the raw source tables and writes of the published tables

pub mod sources;
pub mod writer;

pub use sources::read_sources;
pub use writer::{write_facts, write_locations};
