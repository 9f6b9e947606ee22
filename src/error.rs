use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A required numeric field could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {column} value '{value}'")]
pub struct DecodeError {
    pub column: &'static str,
    pub value: String,
}

/// Fatal failures of a summary run. Every variant aborts the whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read '{}' after line {line}: {source}", path.display())]
    Read {
        path: PathBuf,
        line: u64,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: {source}", path.display())]
    Decode {
        path: PathBuf,
        line: u64,
        #[source]
        source: DecodeError,
    },
    #[error("failed to create output '{target}': {source}")]
    CreateOutput {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write summary: {0}")]
    Output(#[from] csv::Error),
    #[error("failed to start thread '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("thread '{name}' panicked")]
    WorkerPanicked { name: String },
    /// A worker stopped early because another worker failed.
    #[error("run aborted")]
    Aborted,
}

impl From<io::Error> for PipelineError {
    fn from(err: io::Error) -> Self {
        PipelineError::Output(csv::Error::from(err))
    }
}

impl PipelineError {
    /// True when this error is the consequence of another worker's failure.
    pub fn is_aborted(&self) -> bool {
        matches!(self, PipelineError::Aborted)
    }
}
