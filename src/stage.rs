//! Caller-supplied stage functions: generators, performers, processors.
//!
//! Each stage is a trait with a blanket implementation for plain closures, so
//! callers can pass either a named type or `|previous| ...` directly.

use crate::error::{dyn_error, PipelineResult};
use crate::outcome::StageOutcome;

/// Generates a request from the previous (wrapped) result.
pub trait RequestGenerator<Prev, Req>: Send + Sync {
    /// Produce a request based on the previous result.
    fn generate(&self, previous: &PipelineResult<Prev>) -> StageOutcome<Req>;
}

impl<F, Prev, Req> RequestGenerator<Prev, Req> for F
where
    F: Fn(&PipelineResult<Prev>) -> StageOutcome<Req> + Send + Sync,
{
    fn generate(&self, previous: &PipelineResult<Prev>) -> StageOutcome<Req> {
        self(previous)
    }
}

/// Performs a request, producing the raw result.
///
/// The performer borrows the request so the executor can re-invoke it under
/// retry.
pub trait RequestPerformer<Req, Res>: Send + Sync {
    /// Perform the request.
    fn perform(&self, request: &Req) -> StageOutcome<Res>;
}

impl<F, Req, Res> RequestPerformer<Req, Res> for F
where
    F: Fn(&Req) -> StageOutcome<Res> + Send + Sync,
{
    fn perform(&self, request: &Req) -> StageOutcome<Res> {
        self(request)
    }
}

/// Transforms a successful raw result into the caller-facing type.
pub trait ResultProcessor<In, Out>: Send + Sync {
    /// Process the raw result.
    fn process(&self, result: In) -> StageOutcome<Out>;
}

impl<F, In, Out> ResultProcessor<In, Out> for F
where
    F: Fn(In) -> StageOutcome<Out> + Send + Sync,
{
    fn process(&self, result: In) -> StageOutcome<Out> {
        self(result)
    }
}

/// Helper constructors for common generators.
pub mod generators {
    use super::*;

    /// Generator that unwraps the previous result before delegating.
    ///
    /// A previous failure is forwarded directly without invoking the wrapped
    /// closure.
    pub fn force<Prev, Req, F>(generate: F) -> impl RequestGenerator<Prev, Req>
    where
        F: Fn(&Prev) -> StageOutcome<Req> + Send + Sync,
    {
        move |previous: &PipelineResult<Prev>| match previous {
            Ok(prev) => generate(prev),
            Err(err) => StageOutcome::failure(dyn_error(err.clone())),
        }
    }
}

/// Helper constructors for common performers.
pub mod performers {
    use super::*;

    /// Performer that echoes the request back as the result.
    pub fn identity<Req>() -> impl RequestPerformer<Req, Req>
    where
        Req: Clone,
    {
        |request: &Req| StageOutcome::value(request.clone())
    }
}
