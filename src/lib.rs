//! # Reqflow
//!
//! **Reqflow** is a framework for building request-execution pipelines in
//! which cross-cutting concerns (logging, auth injection, metrics, caching)
//! are composed as ordered, filterable middleware instead of being
//! hard-coded into each call site.
//!
//! ## Overview
//!
//! A pipeline execution flows through fixed stages:
//!
//! ```text
//! previous result
//!   -> generate request
//!   -> filter + apply request middlewares
//!   -> perform with bounded retry
//!   -> on failure: wrap as ErrorHolder, route through error middlewares
//!   -> post-process the raw result
//! ```
//!
//! Each stage may complete synchronously or suspend by returning a deferred
//! future or a single-value stream; the engine normalizes all shapes through
//! [`StageOutcome`]. Callers always receive exactly one terminal wrapped
//! result and never an escaped panic.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reqflow::prelude::*;
//!
//! // Assemble a registry of named middlewares (frozen after build).
//! let registry = MiddlewareRegistry::builder()
//!     .add_transform("auth", attach_token)
//!     .add_global_side_effect(log_request)
//!     .build();
//!
//! let executor = RequestExecutor::builder()
//!     .with_request_middlewares(registry)
//!     .build();
//!
//! let result = executor.execute(&previous, &generator, &performer).await;
//! ```
//!
//! ## Features
//!
//! - Generic [`Request`] trait for caller-defined request types
//! - Insertion-ordered [`MiddlewareRegistry`] with inclusive/exclusive
//!   identifier filtering and a reserved global identifier
//! - Bounded, sequential retry at the perform stage
//! - Uniform [`ErrorHolder`] error translation through its own middleware
//!   chain
//! - Builder-based immutable configuration for every engine type

mod error;
mod executor;
mod filter;
mod handler;
mod holder;
mod middleware;
mod outcome;
mod processor;
mod registry;
mod request;
mod stage;

pub mod prelude;

// Re-export core types
pub use error::{dyn_error, dyn_message, DynError, PipelineError, PipelineResult, StageResult};
pub use executor::{RequestExecutor, RequestExecutorBuilder};
pub use filter::{filter, predicate, Filter, Filterable};
pub use handler::RequestHandler;
pub use holder::{ErrorHolder, ErrorHolderBuilder};
pub use middleware::{
    apply_side_effects, apply_transformers, run_side_effects, side_effect, transformer,
    Middleware, SideEffect, Transformer,
};
pub use outcome::{BoxFuture, StageOutcome, StageStream};
pub use processor::{RequestProcessor, RequestProcessorBuilder};
pub use registry::{MiddlewareRegistry, MiddlewareRegistryBuilder, GLOBAL_MIDDLEWARE};
pub use request::Request;
pub use stage::{generators, performers, RequestGenerator, RequestPerformer, ResultProcessor};

// Re-export async-trait for convenience
pub use async_trait::async_trait;
