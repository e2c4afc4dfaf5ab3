//! Stage orchestration

pub mod pipeline;

pub use pipeline::{run_all, run_load, run_transform};
