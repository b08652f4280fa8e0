//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits from
//! Reqflow for convenient glob imports.
//!
//! # Example
//!
//! ```rust
//! use reqflow::prelude::*;
//! ```

// Errors and results
pub use crate::error::{
    dyn_error, dyn_message, DynError, PipelineError, PipelineResult, StageResult,
};

// Filtering
pub use crate::filter::{predicate, Filter, Filterable};

// Middlewares
pub use crate::middleware::{side_effect, transformer, Middleware, SideEffect, Transformer};
pub use crate::registry::{MiddlewareRegistry, MiddlewareRegistryBuilder, GLOBAL_MIDDLEWARE};

// Stage outcomes
pub use crate::outcome::{BoxFuture, StageOutcome, StageStream};

// Engine
pub use crate::executor::{RequestExecutor, RequestExecutorBuilder};
pub use crate::handler::RequestHandler;
pub use crate::holder::{ErrorHolder, ErrorHolderBuilder};
pub use crate::processor::{RequestProcessor, RequestProcessorBuilder};
pub use crate::request::Request;
pub use crate::stage::{generators, performers, RequestGenerator, RequestPerformer, ResultProcessor};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
