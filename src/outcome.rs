//! Normalized return type for pipeline stages.
//!
//! A stage function may produce its result in one of four shapes: a plain
//! value, an already wrapped result, a deferred future, or an asynchronous
//! single-value stream. [`StageOutcome`] models the union as a tagged variant
//! so the engine never has to inspect return values at runtime; every shape
//! collapses to a [`StageResult`] through [`StageOutcome::resolve`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use tokio_stream::StreamExt;

use crate::error::{DynError, PipelineError, StageResult};

/// Type alias for a boxed future producing a stage result.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = StageResult<T>> + Send>>;

/// Type alias for a boxed stream of stage results.
///
/// Stages treat this as a single-value sequence: only the first element is
/// consumed.
pub type StageStream<T> = Pin<Box<dyn Stream<Item = StageResult<T>> + Send>>;

/// The outcome of a single stage invocation.
pub enum StageOutcome<T> {
    /// A plain value, produced synchronously.
    Value(T),
    /// An already wrapped result, produced synchronously.
    Wrapped(StageResult<T>),
    /// A deferred asynchronous result.
    Deferred(BoxFuture<T>),
    /// An asynchronous single-value stream of wrapped results.
    Stream(StageStream<T>),
}

impl<T> StageOutcome<T> {
    /// Outcome carrying a plain value.
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    /// Outcome carrying an already wrapped result.
    pub fn wrapped(result: StageResult<T>) -> Self {
        Self::Wrapped(result)
    }

    /// Outcome carrying a failure.
    pub fn failure(cause: DynError) -> Self {
        Self::Wrapped(Err(cause))
    }

    /// Outcome deferred behind a future.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = StageResult<T>> + Send + 'static,
    {
        Self::Deferred(Box::pin(future))
    }

    /// Outcome carried by an asynchronous single-value stream.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = StageResult<T>> + Send + 'static,
    {
        Self::Stream(Box::pin(stream))
    }

    /// Whether this outcome is backed by an asynchronous channel.
    ///
    /// Only such outcomes are subject to retry; plain and wrapped results
    /// have nothing to re-subscribe to.
    pub fn is_asynchronous(&self) -> bool {
        matches!(self, Self::Deferred(_) | Self::Stream(_))
    }

    /// Collapse the outcome into a single wrapped result.
    ///
    /// A stream outcome yields its first element; a stream that completes
    /// without one resolves to [`PipelineError::EmptyStream`].
    pub async fn resolve(self) -> StageResult<T> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Wrapped(result) => result,
            Self::Deferred(future) => future.await,
            Self::Stream(mut stream) => match stream.next().await {
                Some(result) => result,
                None => Err(Arc::new(PipelineError::EmptyStream) as DynError),
            },
        }
    }
}

impl<T> From<T> for StageOutcome<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}
