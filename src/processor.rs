//! Result post-processing on top of the executor.

use crate::error::{PipelineError, PipelineResult};
use crate::executor::RequestExecutor;
use crate::request::Request;
use crate::stage::{RequestGenerator, RequestPerformer, ResultProcessor};

/// Executes a request and transforms its raw result into some other type,
/// hiding the internal shape of the executed requests from callers.
pub struct RequestProcessor<Req> {
    executor: Option<RequestExecutor<Req>>,
}

impl<Req> Clone for RequestProcessor<Req> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
        }
    }
}

impl<Req> Default for RequestProcessor<Req> {
    fn default() -> Self {
        Self { executor: None }
    }
}

impl<Req: Request> RequestProcessor<Req> {
    /// Start building a processor.
    pub fn builder() -> RequestProcessorBuilder<Req> {
        RequestProcessorBuilder::new()
    }

    /// Start a builder pre-populated with this processor's executor.
    pub fn clone_builder(&self) -> RequestProcessorBuilder<Req> {
        Self::builder().with_buildable(self)
    }

    /// Execute a request and process the result into `Out`.
    ///
    /// A missing executor is a configuration failure: it fails immediately
    /// without invoking the generator or performer. An executor failure
    /// short-circuits without invoking the result processor.
    pub async fn process<Prev, Res, Out, G, P, R>(
        &self,
        previous: &PipelineResult<Prev>,
        generator: &G,
        performer: &P,
        processor: &R,
    ) -> PipelineResult<Out>
    where
        G: RequestGenerator<Prev, Req> + ?Sized,
        P: RequestPerformer<Req, Res> + ?Sized,
        R: ResultProcessor<Res, Out> + ?Sized,
    {
        let Some(executor) = &self.executor else {
            tracing::debug!("processing refused: no executor configured");
            return Err(PipelineError::MissingExecutor);
        };

        let result = executor.execute(previous, generator, performer).await?;
        processor
            .process(result)
            .resolve()
            .await
            .map_err(PipelineError::Processing)
    }
}

/// Builder for [`RequestProcessor`].
pub struct RequestProcessorBuilder<Req> {
    processor: RequestProcessor<Req>,
}

impl<Req: Request> RequestProcessorBuilder<Req> {
    /// Create a builder with no executor configured.
    pub fn new() -> Self {
        Self {
            processor: RequestProcessor::default(),
        }
    }

    /// Set the executor.
    pub fn with_executor(mut self, executor: RequestExecutor<Req>) -> Self {
        self.processor.executor = Some(executor);
        self
    }

    /// Copy the executor from an existing processor.
    pub fn with_buildable(mut self, other: &RequestProcessor<Req>) -> Self {
        self.processor = other.clone();
        self
    }

    /// Freeze the processor.
    pub fn build(self) -> RequestProcessor<Req> {
        self.processor
    }
}

impl<Req: Request> Default for RequestProcessorBuilder<Req> {
    fn default() -> Self {
        Self::new()
    }
}
