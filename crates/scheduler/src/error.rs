// error.rs
// Error types shared by the partitioner, the fan-out runner and the config layer.
use crate::types::ChunkSpan;
use std::time::Duration;
use thiserror::Error;

/// Boxed error returned by caller-supplied chunk work.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// A partition argument or policy name was rejected. Nothing was produced.
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A per-chunk task did not complete successfully. The reason is the
    /// error source.
    #[error("Task for chunk #{index} ({span}) failed")]
    TaskFailure {
        index: usize,
        span: ChunkSpan,
        #[source]
        cause: FailureCause,
    },

    /// The aggregate run was cancelled before every task finished.
    #[error("Run cancelled before all chunk tasks completed")]
    Cancelled,

    /// The merger was handed a different number of results than chunks.
    #[error("Expected {expected} chunk results, got {actual}")]
    ResultMismatch { expected: usize, actual: usize },

    /// Configuration could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Why a single chunk task failed.
#[derive(Error, Debug)]
pub enum FailureCause {
    /// The work function returned an error.
    #[error(transparent)]
    Failed(BoxError),

    /// The work function panicked.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The work function exceeded the configured per-task timeout.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Index of the chunk whose task failed, if this is a task failure.
    pub fn failed_chunk(&self) -> Option<usize> {
        match self {
            Error::TaskFailure { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(format!("invalid JSON: {e}"))
    }
}
