//! High-level request handling facade.
//!
//! A handler owns a processor and a performer for one family of requests,
//! so callers only supply a generator and a result processor per call. This
//! keeps the request type and the I/O wiring as implementation details of
//! the handler.

use async_trait::async_trait;

use crate::error::PipelineResult;
use crate::processor::RequestProcessor;
use crate::request::Request;
use crate::stage::{RequestGenerator, RequestPerformer, ResultProcessor};

/// A type fully capable of handling all requests of one particular kind.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// The request type this handler executes.
    type Req: Request;
    /// The raw result type produced by this handler's performer.
    type Res: Send + 'static;

    /// The processor driving this handler's executions.
    fn processor(&self) -> &RequestProcessor<Self::Req>;

    /// The performer used for every request of this handler.
    fn performer(&self) -> &dyn RequestPerformer<Self::Req, Self::Res>;

    /// Generate, execute, and post-process one request.
    async fn request<Prev, Out>(
        &self,
        previous: &PipelineResult<Prev>,
        generator: &dyn RequestGenerator<Prev, Self::Req>,
        processor: &dyn ResultProcessor<Self::Res, Out>,
    ) -> PipelineResult<Out>
    where
        Prev: Send + Sync,
        Out: Send,
    {
        self.processor()
            .process(previous, generator, self.performer(), processor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::RequestExecutor;
    use crate::outcome::StageOutcome;
    use crate::stage::generators;

    #[derive(Clone, Default)]
    struct EchoRequest {
        payload: String,
    }

    impl crate::filter::Filterable<String> for EchoRequest {}

    impl Request for EchoRequest {
        fn request_description(&self) -> String {
            format!("echo {}", self.payload)
        }
    }

    struct EchoHandler {
        processor: RequestProcessor<EchoRequest>,
        performer: Box<dyn RequestPerformer<EchoRequest, String>>,
    }

    impl EchoHandler {
        fn new() -> Self {
            Self {
                processor: RequestProcessor::builder()
                    .with_executor(RequestExecutor::builder().build())
                    .build(),
                performer: Box::new(|request: &EchoRequest| {
                    StageOutcome::value(request.payload.clone())
                }),
            }
        }
    }

    impl RequestHandler for EchoHandler {
        type Req = EchoRequest;
        type Res = String;

        fn processor(&self) -> &RequestProcessor<EchoRequest> {
            &self.processor
        }

        fn performer(&self) -> &dyn RequestPerformer<EchoRequest, String> {
            self.performer.as_ref()
        }
    }

    #[tokio::test]
    async fn test_handler_runs_full_pipeline() {
        let handler = EchoHandler::new();

        let generator = generators::force(|prev: &String| {
            StageOutcome::value(EchoRequest {
                payload: prev.clone(),
            })
        });
        let post = |payload: String| StageOutcome::value(payload.to_uppercase());

        let result = handler
            .request(&Ok("hello".to_string()), &generator, &post)
            .await;

        assert_eq!(result.unwrap(), "HELLO");
    }
}
