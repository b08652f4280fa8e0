//! Named middleware wrappers and the transform / side-effect chains.
//!
//! A middleware is an immutable `(identifier, behavior)` pair. The identifier
//! is the filtering key; behaviors come in two kinds, transforms that may
//! replace the value flowing through the pipeline and side effects that only
//! observe it.

use std::fmt;
use std::sync::Arc;

use crate::error::StageResult;
use crate::outcome::StageOutcome;
use crate::registry::GLOBAL_MIDDLEWARE;

/// A value-transforming middleware behavior.
///
/// Must be safe to invoke more than once: the perform stage may re-run
/// transformed requests under retry.
pub type Transformer<T> = Arc<dyn Fn(T) -> StageOutcome<T> + Send + Sync>;

/// An observer middleware behavior. Failures propagate as pipeline failures
/// but never alter the value produced by the transform stage.
pub type SideEffect<T> = Arc<dyn Fn(&T) -> StageResult<()> + Send + Sync>;

/// Build a [`Transformer`] from a closure.
pub fn transformer<T>(
    transform: impl Fn(T) -> StageOutcome<T> + Send + Sync + 'static,
) -> Transformer<T> {
    Arc::new(transform)
}

/// Build a [`SideEffect`] from a closure.
pub fn side_effect<T>(
    effect: impl Fn(&T) -> StageResult<()> + Send + Sync + 'static,
) -> SideEffect<T> {
    Arc::new(effect)
}

/// An immutable, named middleware.
#[derive(Clone)]
pub struct Middleware<B> {
    identifier: String,
    behavior: B,
}

impl<B> Middleware<B> {
    /// Wrap a behavior under the given identifier.
    pub fn new(identifier: impl Into<String>, behavior: B) -> Self {
        Self {
            identifier: identifier.into(),
            behavior,
        }
    }

    /// The identifier used as the filtering key.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The wrapped behavior.
    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    /// Whether this middleware is registered under the reserved global
    /// identifier and therefore bypasses a target's own filters.
    pub fn is_global(&self) -> bool {
        self.identifier == GLOBAL_MIDDLEWARE
    }
}

impl<B> fmt::Debug for Middleware<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// Apply transforms to a value, left to right, short-circuiting on the first
/// failure.
///
/// An `initial` failure is emitted untouched without invoking any transform.
/// Each transform outcome is resolved before the next transform runs; no
/// transform after the first failure is ever invoked.
pub async fn apply_transformers<T>(
    initial: StageResult<T>,
    transformers: &[Transformer<T>],
) -> StageResult<T> {
    let mut current = initial?;
    for transform in transformers {
        current = transform(current).resolve().await?;
    }
    Ok(current)
}

/// Run side effects over an already unwrapped value, in order, fail-fast.
///
/// Effects already executed before a failure are not reverted.
pub fn run_side_effects<T>(value: &T, effects: &[SideEffect<T>]) -> StageResult<()> {
    for effect in effects {
        effect(value)?;
    }
    Ok(())
}

/// Apply side effects to a wrapped value.
///
/// A failure value propagates immediately; side effects require a
/// successfully produced value as precondition.
pub fn apply_side_effects<T>(value: &StageResult<T>, effects: &[SideEffect<T>]) -> StageResult<()> {
    let value = value.as_ref().map_err(Arc::clone)?;
    run_side_effects(value, effects)
}
