//! # Olist Common Library
//!
//! Shared code for the Olist analytics pipeline:
//! - Error type with pipeline-stage context
//! - Configuration loading
//! - SQLite connection setup
//! - Declarative schemas for published tables and required source columns

pub mod config;
pub mod db;
pub mod error;

pub use config::EtlConfig;
pub use error::{Error, PipelineStage, Result, StageContext};
