//! Utility modules

pub mod casts;
