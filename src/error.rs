//! Error types for reqflow pipelines.

use std::sync::Arc;

use thiserror::Error;

use crate::holder::ErrorHolder;

/// A clonable, shareable error cause.
///
/// Stage functions surface failures as `DynError` so the engine can keep the
/// last error across retries and thread previous failures through generators
/// without consuming them.
pub type DynError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Result type produced by individual stage functions and middleware chains.
pub type StageResult<T> = Result<T, DynError>;

/// Result type returned to callers of the executor and processor.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failure of a pipeline execution, classified by the stage that raised it.
///
/// Every stage converts its failures into a `PipelineError` at the stage
/// boundary; callers always receive a single terminal [`PipelineResult`] and
/// never an escaped panic.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// The request generator failed.
    #[error("request generation failed: {0}")]
    Generation(#[source] DynError),

    /// A transform or side-effect middleware failed.
    #[error("middleware failed: {0}")]
    Middleware(#[source] DynError),

    /// The request performer failed, after exhausting its retry budget.
    #[error("request failed after {attempts} attempt(s): {source}")]
    Perform {
        /// Number of performer invocations, including the first attempt.
        attempts: u32,
        /// The last error surfaced by the performer.
        #[source]
        source: DynError,
    },

    /// The result processor failed.
    #[error("result processing failed: {0}")]
    Processing(#[source] DynError),

    /// A processor was used without a configured executor.
    #[error("request executor is not configured")]
    MissingExecutor,

    /// A single-value stream completed without producing a value.
    #[error("stream completed without producing a value")]
    EmptyStream,

    /// A generic described failure.
    #[error("{0}")]
    Message(String),

    /// A failure translated through the error middleware chain.
    #[error(transparent)]
    Intercepted(ErrorHolder),
}

impl PipelineError {
    /// The underlying cause for stage failures, if any.
    pub fn cause(&self) -> Option<&DynError> {
        match self {
            Self::Generation(cause) | Self::Middleware(cause) | Self::Processing(cause) => {
                Some(cause)
            }
            Self::Perform { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The translated error holder, if this failure went through the error
    /// middleware chain.
    pub fn holder(&self) -> Option<&ErrorHolder> {
        match self {
            Self::Intercepted(holder) => Some(holder),
            _ => None,
        }
    }
}

impl From<String> for PipelineError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for PipelineError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

/// Wrap a concrete error as a shareable [`DynError`] cause.
pub fn dyn_error(err: impl std::error::Error + Send + Sync + 'static) -> DynError {
    Arc::new(err)
}

/// Build a [`DynError`] cause from a plain message.
pub fn dyn_message(message: impl Into<String>) -> DynError {
    Arc::new(PipelineError::Message(message.into()))
}
