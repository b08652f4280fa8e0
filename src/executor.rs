//! Request execution engine.
//!
//! One executor covers both the bare and the fully instrumented pipeline:
//! leave the registries unset for plain generate-perform execution, or
//! configure a request registry, an error registry, or both. Stages run
//! strictly in sequence for one execution; independent executions sharing an
//! executor are unordered.

use crate::error::{dyn_error, PipelineError, PipelineResult, StageResult};
use crate::holder::ErrorHolder;
use crate::registry::MiddlewareRegistry;
use crate::request::Request;
use crate::stage::{RequestGenerator, RequestPerformer};

/// Executes requests: generate, apply request middlewares, perform with
/// retry, translate failures through error middlewares.
pub struct RequestExecutor<Req> {
    request_middlewares: Option<MiddlewareRegistry<Req>>,
    error_middlewares: Option<MiddlewareRegistry<ErrorHolder>>,
}

impl<Req> Clone for RequestExecutor<Req> {
    fn clone(&self) -> Self {
        Self {
            request_middlewares: self.request_middlewares.clone(),
            error_middlewares: self.error_middlewares.clone(),
        }
    }
}

impl<Req> Default for RequestExecutor<Req> {
    fn default() -> Self {
        Self {
            request_middlewares: None,
            error_middlewares: None,
        }
    }
}

impl<Req: Request> RequestExecutor<Req> {
    /// Start building an executor.
    pub fn builder() -> RequestExecutorBuilder<Req> {
        RequestExecutorBuilder::new()
    }

    /// Start a builder pre-populated with this executor's registries.
    pub fn clone_builder(&self) -> RequestExecutorBuilder<Req> {
        Self::builder().with_buildable(self)
    }

    /// Generate a request from the previous result and execute it.
    ///
    /// Emits exactly one terminal wrapped result: the performer's success
    /// value, or the (possibly middleware-translated) failure.
    pub async fn execute<Prev, Res, G, P>(
        &self,
        previous: &PipelineResult<Prev>,
        generator: &G,
        performer: &P,
    ) -> PipelineResult<Res>
    where
        G: RequestGenerator<Prev, Req> + ?Sized,
        P: RequestPerformer<Req, Res> + ?Sized,
    {
        let request = match generator.generate(previous).resolve().await {
            Ok(request) => request,
            Err(cause) => {
                let failure = self
                    .intercept_failure(None, PipelineError::Generation(cause))
                    .await;
                return Err(failure);
            }
        };

        let description = request.request_description();
        tracing::debug!(request = %description, "executing request");

        let request = match self.apply_request_middlewares(request).await {
            Ok(request) => request,
            Err(cause) => {
                let failure = self
                    .intercept_failure(Some(description), PipelineError::Middleware(cause))
                    .await;
                return Err(failure);
            }
        };

        match self.perform_with_retry(&request, performer).await {
            Ok(result) => {
                tracing::debug!(request = %request.request_description(), "request succeeded");
                Ok(result)
            }
            Err(err) => {
                let failure = self
                    .intercept_failure(Some(request.request_description()), err)
                    .await;
                Err(failure)
            }
        }
    }

    async fn apply_request_middlewares(&self, request: Req) -> StageResult<Req> {
        match &self.request_middlewares {
            Some(registry) => registry.apply_middlewares(request).await,
            None => Ok(request),
        }
    }

    /// Perform the request, re-invoking the performer on failure.
    ///
    /// Only asynchronous outcomes are retried; a plain or wrapped result has
    /// no channel to re-subscribe to. Attempts run sequentially: each must
    /// fully fail before the next starts.
    async fn perform_with_retry<Res, P>(
        &self,
        request: &Req,
        performer: &P,
    ) -> Result<Res, PipelineError>
    where
        P: RequestPerformer<Req, Res> + ?Sized,
    {
        let outcome = performer.perform(request);
        let retryable = outcome.is_asynchronous();
        let retries = request.request_retries();
        let mut attempts: u32 = 1;
        let mut last = outcome.resolve().await;

        if retryable {
            while last.is_err() && attempts <= retries {
                attempts += 1;
                tracing::warn!(
                    attempt = attempts,
                    budget = retries.saturating_add(1),
                    request = %request.request_description(),
                    "retrying request"
                );
                last = performer.perform(request).resolve().await;
            }
        }

        last.map_err(|source| PipelineError::Perform { attempts, source })
    }

    /// Translate a failure through the error middleware chain, if configured.
    ///
    /// An existing holder is rebuilt with the current request's description,
    /// preserving its original cause; any other failure becomes a fresh
    /// holder. Without an error registry the failure propagates unchanged.
    async fn intercept_failure(
        &self,
        description: Option<String>,
        error: PipelineError,
    ) -> PipelineError {
        let Some(registry) = &self.error_middlewares else {
            return error;
        };

        let holder = match existing_holder(&error) {
            Some(holder) => holder
                .clone_builder()
                .with_maybe_description(description)
                .build(),
            None => ErrorHolder::builder()
                .with_maybe_description(description)
                .with_original(dyn_error(error))
                .build(),
        };

        tracing::warn!(error = %holder, "translating failure through error middlewares");

        match registry.apply_middlewares(holder).await {
            Ok(holder) => PipelineError::Intercepted(holder),
            Err(cause) => PipelineError::Middleware(cause),
        }
    }
}

/// Look for a holder already carried by a failure, either directly or nested
/// inside a stage error's cause.
fn existing_holder(error: &PipelineError) -> Option<&ErrorHolder> {
    if let PipelineError::Intercepted(holder) = error {
        return Some(holder);
    }
    let cause = error.cause()?;
    cause.downcast_ref::<ErrorHolder>().or_else(|| {
        cause
            .downcast_ref::<PipelineError>()
            .and_then(PipelineError::holder)
    })
}

/// Builder for [`RequestExecutor`].
pub struct RequestExecutorBuilder<Req> {
    executor: RequestExecutor<Req>,
}

impl<Req: Request> RequestExecutorBuilder<Req> {
    /// Create a builder with no registries configured.
    pub fn new() -> Self {
        Self {
            executor: RequestExecutor::default(),
        }
    }

    /// Set the request middleware registry.
    pub fn with_request_middlewares(mut self, registry: MiddlewareRegistry<Req>) -> Self {
        self.executor.request_middlewares = Some(registry);
        self
    }

    /// Set the error middleware registry.
    pub fn with_error_middlewares(mut self, registry: MiddlewareRegistry<ErrorHolder>) -> Self {
        self.executor.error_middlewares = Some(registry);
        self
    }

    /// Copy all registries from an existing executor.
    pub fn with_buildable(mut self, other: &RequestExecutor<Req>) -> Self {
        self.executor = other.clone();
        self
    }

    /// Freeze the executor.
    pub fn build(self) -> RequestExecutor<Req> {
        self.executor
    }
}

impl<Req: Request> Default for RequestExecutorBuilder<Req> {
    fn default() -> Self {
        Self::new()
    }
}
