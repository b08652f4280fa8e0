//! Integration tests for Reqflow
//!
//! These tests drive a small API-client style pipeline end to end: request
//! generation, filterable middleware, retrying execution, error translation
//! and result post-processing.

use reqflow::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// Test request type
// =============================================================================

/// An API request with a fluent builder, the way callers of the engine are
/// expected to define their request types.
#[derive(Clone, Default)]
struct ApiRequest {
    endpoint: String,
    headers: Vec<(String, String)>,
    retries: u32,
    inclusive: Option<Vec<Filter<String>>>,
    exclusive: Vec<Filter<String>>,
}

impl ApiRequest {
    fn builder() -> ApiRequestBuilder {
        ApiRequestBuilder::default()
    }
}

impl Filterable<String> for ApiRequest {
    fn inclusive_filters(&self) -> Option<&[Filter<String>]> {
        self.inclusive.as_deref()
    }

    fn exclusive_filters(&self) -> &[Filter<String>] {
        &self.exclusive
    }
}

impl Request for ApiRequest {
    fn request_description(&self) -> String {
        format!("GET {}", self.endpoint)
    }

    fn request_retries(&self) -> u32 {
        self.retries
    }
}

#[derive(Default)]
struct ApiRequestBuilder {
    request: ApiRequest,
}

impl ApiRequestBuilder {
    fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.request.endpoint = endpoint.to_string();
        self
    }

    fn with_retries(mut self, retries: u32) -> Self {
        self.request.retries = retries;
        self
    }

    fn with_inclusive_filters(mut self, filters: Vec<Filter<String>>) -> Self {
        self.request.inclusive = Some(filters);
        self
    }

    fn with_exclusive_filters(mut self, filters: Vec<Filter<String>>) -> Self {
        self.request.exclusive = filters;
        self
    }

    fn with_buildable(mut self, other: &ApiRequest) -> Self {
        self.request = other.clone();
        self
    }

    fn build(self) -> ApiRequest {
        self.request
    }
}

// =============================================================================
// Full pipeline
// =============================================================================

#[tokio::test]
async fn test_full_pipeline_with_middlewares() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let watcher = Arc::clone(&log);
    let request_registry = MiddlewareRegistry::<ApiRequest>::builder()
        .add_transform("auth", |mut request: ApiRequest| {
            request
                .headers
                .push(("authorization".to_string(), "token-123".to_string()));
            StageOutcome::value(request)
        })
        .add_global_side_effect(move |request: &ApiRequest| {
            watcher.lock().unwrap().push(request.request_description());
            Ok(())
        })
        .build();

    let executor = RequestExecutor::builder()
        .with_request_middlewares(request_registry)
        .build();
    let processor = RequestProcessor::builder().with_executor(executor).build();

    let generator = generators::force(|user_id: &u32| {
        StageOutcome::value(
            ApiRequest::builder()
                .with_endpoint(&format!("/users/{user_id}"))
                .build(),
        )
    });
    let performer = |request: &ApiRequest| {
        // The auth middleware must have run before the request is performed.
        let authorized = request
            .headers
            .iter()
            .any(|(name, _)| name == "authorization");
        let endpoint = request.endpoint.clone();
        StageOutcome::deferred(async move {
            if authorized {
                Ok(format!("body of {endpoint}"))
            } else {
                Err(dyn_message("401 unauthorized"))
            }
        })
    };
    let post = |body: String| StageOutcome::value(body.len());

    let result = processor.process(&Ok(42u32), &generator, &performer, &post).await;

    assert_eq!(result.unwrap(), "body of /users/42".len());
    assert_eq!(&*log.lock().unwrap(), &["GET /users/42".to_string()]);
}

#[tokio::test]
async fn test_global_middlewares_run_before_named_ones() {
    let order = Arc::new(Mutex::new(Vec::new()));

    let named = Arc::clone(&order);
    let global = Arc::clone(&order);
    let registry = MiddlewareRegistry::<ApiRequest>::builder()
        .add_side_effect("metrics", move |_: &ApiRequest| {
            named.lock().unwrap().push("metrics");
            Ok(())
        })
        .add_global_side_effect(move |_: &ApiRequest| {
            global.lock().unwrap().push("global");
            Ok(())
        })
        .build();

    let executor = RequestExecutor::builder()
        .with_request_middlewares(registry)
        .build();

    let generator = generators::force(|_: &()| {
        StageOutcome::value(ApiRequest::builder().with_endpoint("/health").build())
    });
    let performer = performers::identity::<ApiRequest>();

    let result: PipelineResult<ApiRequest> =
        executor.execute(&Ok(()), &generator, &performer).await;

    assert!(result.is_ok());
    assert_eq!(&*order.lock().unwrap(), &["global", "metrics"]);
}

#[tokio::test]
async fn test_inclusive_filters_select_middlewares() {
    let applied = Arc::new(Mutex::new(Vec::new()));

    let auth_spy = Arc::clone(&applied);
    let cache_spy = Arc::clone(&applied);
    let registry = MiddlewareRegistry::<ApiRequest>::builder()
        .add_side_effect("auth", move |_: &ApiRequest| {
            auth_spy.lock().unwrap().push("auth");
            Ok(())
        })
        .add_side_effect("cache", move |_: &ApiRequest| {
            cache_spy.lock().unwrap().push("cache");
            Ok(())
        })
        .build();

    let executor = RequestExecutor::builder()
        .with_request_middlewares(registry)
        .build();

    let generator = generators::force(|_: &()| {
        StageOutcome::value(
            ApiRequest::builder()
                .with_endpoint("/orders")
                .with_inclusive_filters(vec![predicate(|id: &String| id == "auth")])
                .build(),
        )
    });
    let performer = performers::identity::<ApiRequest>();

    let result: PipelineResult<ApiRequest> =
        executor.execute(&Ok(()), &generator, &performer).await;

    assert!(result.is_ok());
    assert_eq!(&*applied.lock().unwrap(), &["auth"]);
}

// =============================================================================
// Retry behaviour
// =============================================================================

#[tokio::test]
async fn test_retry_recovers_transient_failures() {
    let executor = RequestExecutor::<ApiRequest>::builder().build();

    let generator = generators::force(|_: &()| {
        StageOutcome::value(
            ApiRequest::builder()
                .with_endpoint("/flaky")
                .with_retries(3)
                .build(),
        )
    });

    let attempts = Arc::new(AtomicU32::new(0));
    let spy = Arc::clone(&attempts);
    let performer = move |_: &ApiRequest| {
        let attempt = spy.fetch_add(1, Ordering::SeqCst) + 1;
        StageOutcome::deferred(async move {
            if attempt <= 2 {
                Err(dyn_message("503 service unavailable"))
            } else {
                Ok("recovered".to_string())
            }
        })
    };

    let result: PipelineResult<String> =
        executor.execute(&Ok(()), &generator, &performer).await;

    assert_eq!(result.unwrap(), "recovered");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

// =============================================================================
// Stream-backed performers
// =============================================================================

#[tokio::test]
async fn test_stream_backed_performer_takes_first_value() {
    let executor = RequestExecutor::<ApiRequest>::builder().build();

    let generator = generators::force(|_: &()| {
        StageOutcome::value(ApiRequest::builder().with_endpoint("/events").build())
    });
    let performer = |_: &ApiRequest| {
        StageOutcome::stream(futures::stream::iter(vec![
            Ok("first event".to_string()),
            Ok("second event".to_string()),
        ]))
    };

    let result: PipelineResult<String> =
        executor.execute(&Ok(()), &generator, &performer).await;

    assert_eq!(result.unwrap(), "first event");
}

#[tokio::test]
async fn test_empty_stream_is_a_perform_failure() {
    let executor = RequestExecutor::<ApiRequest>::builder().build();

    let generator = generators::force(|_: &()| {
        StageOutcome::value(ApiRequest::builder().with_endpoint("/events").build())
    });
    let performer = |_: &ApiRequest| -> StageOutcome<String> {
        StageOutcome::stream(futures::stream::empty())
    };

    let result: PipelineResult<String> =
        executor.execute(&Ok(()), &generator, &performer).await;

    match result.unwrap_err() {
        PipelineError::Perform { attempts, source } => {
            assert_eq!(attempts, 1);
            assert!(source
                .downcast_ref::<PipelineError>()
                .is_some_and(|err| matches!(err, PipelineError::EmptyStream)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// Error translation
// =============================================================================

#[tokio::test]
async fn test_failures_are_translated_and_enriched() {
    let seen = Arc::new(Mutex::new(Vec::new()));

    let spy = Arc::clone(&seen);
    let error_registry = MiddlewareRegistry::<ErrorHolder>::builder()
        .add_global_side_effect(move |holder: &ErrorHolder| {
            spy.lock().unwrap().push(holder.to_string());
            Ok(())
        })
        .build();

    let executor = RequestExecutor::builder()
        .with_error_middlewares(error_registry)
        .build();

    let generator = generators::force(|_: &()| {
        StageOutcome::value(ApiRequest::builder().with_endpoint("/billing").build())
    });
    let performer = |_: &ApiRequest| -> StageOutcome<String> {
        StageOutcome::deferred(async { Err(dyn_message("500 internal error")) })
    };

    let result: PipelineResult<String> =
        executor.execute(&Ok(()), &generator, &performer).await;

    let err = result.unwrap_err();
    let holder = err.holder().expect("failure should carry a holder");
    assert_eq!(holder.request_description(), Some("GET /billing"));
    assert!(holder.message().contains("500 internal error"));

    let observed = seen.lock().unwrap();
    assert_eq!(observed.len(), 1);
    assert!(observed[0].starts_with("GET /billing"));
}

#[tokio::test]
async fn test_nested_pipeline_failure_keeps_root_cause() {
    // An inner pipeline already produced a holder; the outer pipeline must
    // only overwrite the description.
    let error_registry = MiddlewareRegistry::<ErrorHolder>::builder().build();
    let executor = RequestExecutor::builder()
        .with_error_middlewares(error_registry)
        .build();

    let root_cause = dyn_message("disk full");
    let inner_holder = ErrorHolder::builder()
        .with_request_description("GET /inner")
        .with_original(Arc::clone(&root_cause))
        .build();

    let generator = generators::force(|_: &()| {
        StageOutcome::value(ApiRequest::builder().with_endpoint("/outer").build())
    });
    let inner_failure: DynError = Arc::new(inner_holder);
    let performer = move |_: &ApiRequest| -> StageOutcome<String> {
        StageOutcome::failure(Arc::clone(&inner_failure))
    };

    let result: PipelineResult<String> =
        executor.execute(&Ok(()), &generator, &performer).await;

    let err = result.unwrap_err();
    let holder = err.holder().expect("failure should carry a holder");
    assert_eq!(holder.request_description(), Some("GET /outer"));
    assert!(Arc::ptr_eq(holder.original().unwrap(), &root_cause));
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_processor_without_executor_is_a_configuration_failure() {
    let processor = RequestProcessor::<ApiRequest>::builder().build();

    let generator_calls = Arc::new(AtomicU32::new(0));
    let spy = Arc::clone(&generator_calls);
    let generator = move |_: &PipelineResult<()>| -> StageOutcome<ApiRequest> {
        spy.fetch_add(1, Ordering::SeqCst);
        StageOutcome::value(ApiRequest::default())
    };
    let performer = performers::identity::<ApiRequest>();
    let post = |request: ApiRequest| StageOutcome::value(request.endpoint);

    let result: PipelineResult<String> = processor
        .process(&Ok(()), &generator, &performer, &post)
        .await;

    assert!(matches!(result.unwrap_err(), PipelineError::MissingExecutor));
    assert_eq!(generator_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_clone_builders_share_configuration() {
    let registry = MiddlewareRegistry::<ApiRequest>::builder()
        .add_transform("auth", |request| StageOutcome::value(request))
        .build();

    let executor = RequestExecutor::builder()
        .with_request_middlewares(registry)
        .build();

    // Derive a second executor with error translation added on top.
    let extended = executor
        .clone_builder()
        .with_error_middlewares(MiddlewareRegistry::<ErrorHolder>::builder().build())
        .build();

    let generator = generators::force(|_: &()| {
        StageOutcome::value(ApiRequest::builder().with_endpoint("/ping").build())
    });
    let performer = |_: &ApiRequest| -> StageOutcome<String> {
        StageOutcome::failure(dyn_message("boom"))
    };

    let plain: PipelineResult<String> = executor.execute(&Ok(()), &generator, &performer).await;
    let translated: PipelineResult<String> =
        extended.execute(&Ok(()), &generator, &performer).await;

    // Same failure, but only the extended executor wraps it in a holder.
    assert!(plain.unwrap_err().holder().is_none());
    assert!(translated.unwrap_err().holder().is_some());
}

#[tokio::test]
async fn test_request_builder_copy_construction() {
    let base = ApiRequest::builder()
        .with_endpoint("/users")
        .with_retries(2)
        .with_exclusive_filters(vec![predicate(|id: &String| id == "cache")])
        .build();

    let copied = ApiRequest::builder()
        .with_buildable(&base)
        .with_endpoint("/users/7")
        .build();

    assert_eq!(copied.request_description(), "GET /users/7");
    assert_eq!(copied.request_retries(), 2);
    assert_eq!(copied.exclusive_filters().len(), 1);
}
