//! Common error types for the Olist pipeline
//!
//! Every failure aborts the run. Stage context is attached by the pipeline
//! workflow through [`Error::Stage`] so the caller can tell which step failed.

use std::fmt;
use thiserror::Error;

/// Common result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline step in which an error surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Raw CSV files loaded into raw tables
    LoadRaw,
    /// Raw source tables read and shape-checked
    ReadSources,
    /// Views, aggregates and KPIs for the fact table
    AssembleFacts,
    /// dim_locations replaced
    WriteLocations,
    /// master_table replaced
    WriteFacts,
    /// Uniqueness constraint and lookup indexes
    Finalize,
    /// Transaction commit
    Commit,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::LoadRaw => "load raw tables",
            PipelineStage::ReadSources => "read sources",
            PipelineStage::AssembleFacts => "assemble facts",
            PipelineStage::WriteLocations => "write dim_locations",
            PipelineStage::WriteFacts => "write master_table",
            PipelineStage::Finalize => "finalize schema",
            PipelineStage::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// Common error types across the loader and the transform
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error (wraps csv::Error)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required source table or column is missing
    #[error("Input shape error: table '{table}' is missing {column}")]
    InputShape { table: String, column: String },

    /// Duplicate natural key detected while finalizing a table
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A cast or arithmetic operation failed on malformed data
    #[error("Transformation fault: {0}")]
    Transform(String),

    /// Any of the above, tagged with the step that produced it
    #[error("Pipeline stage '{stage}' failed: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Tag this error with the pipeline stage it surfaced in
    ///
    /// An error that already carries a stage keeps its original one.
    pub fn in_stage(self, stage: PipelineStage) -> Self {
        match self {
            Error::Stage { .. } => self,
            other => Error::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage the error surfaced in, if known
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost error with stage tagging removed
    pub fn root(&self) -> &Error {
        match self {
            Error::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Attach a pipeline stage to any `Result<T>`
pub trait StageContext<T> {
    fn stage(self, stage: PipelineStage) -> Result<T>;
}

impl<T, E: Into<Error>> StageContext<T> for std::result::Result<T, E> {
    fn stage(self, stage: PipelineStage) -> Result<T> {
        self.map_err(|e| e.into().in_stage(stage))
    }
}
