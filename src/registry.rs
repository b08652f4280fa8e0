//! Ordered, filterable collections of named middlewares.
//!
//! A [`MiddlewareRegistry`] owns two insertion-ordered lists, one of
//! transforms and one of side effects. Registries are assembled once through
//! the builder and are read-only afterwards; concurrent in-flight executions
//! may share one registry freely.

use std::sync::Arc;

use crate::error::StageResult;
use crate::filter::{self, Filterable};
use crate::middleware::{self, Middleware, SideEffect, Transformer};
use crate::outcome::StageOutcome;

/// Reserved identifier for global middlewares.
///
/// A middleware registered under this identifier bypasses the target's own
/// filters and always runs, ahead of every non-global middleware. The name is
/// part of the configuration contract; treat it as a reserved namespace and
/// never register ordinary middlewares under it.
pub const GLOBAL_MIDDLEWARE: &str = "hp_global_middleware";

/// An ordered registry of transform and side-effect middlewares over `T`.
pub struct MiddlewareRegistry<T> {
    transforms: Vec<Middleware<Transformer<T>>>,
    side_effects: Vec<Middleware<SideEffect<T>>>,
}

impl<T> Clone for MiddlewareRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            transforms: self.transforms.clone(),
            side_effects: self.side_effects.clone(),
        }
    }
}

impl<T> Default for MiddlewareRegistry<T> {
    fn default() -> Self {
        Self {
            transforms: Vec::new(),
            side_effects: Vec::new(),
        }
    }
}

impl<T> std::fmt::Debug for MiddlewareRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareRegistry")
            .field("transforms", &self.transforms)
            .field("side_effects", &self.side_effects)
            .finish()
    }
}

impl<T: Filterable<String>> MiddlewareRegistry<T> {
    /// Start building a registry.
    pub fn builder() -> MiddlewareRegistryBuilder<T> {
        MiddlewareRegistryBuilder::new()
    }

    /// Start a builder pre-populated with this registry's middlewares.
    pub fn clone_builder(&self) -> MiddlewareRegistryBuilder<T> {
        Self::builder().with_buildable(self)
    }

    /// The registered transforms, in insertion order.
    pub fn transforms(&self) -> &[Middleware<Transformer<T>>] {
        &self.transforms
    }

    /// The registered side effects, in insertion order.
    pub fn side_effects(&self) -> &[Middleware<SideEffect<T>>] {
        &self.side_effects
    }

    /// Select the middlewares that apply to `obj`.
    ///
    /// A globally filterable target gets every middleware unchanged. For any
    /// other target, global-identified middlewares run first and
    /// unconditionally; the rest are filtered by identifier against the
    /// target's own filter sets, keeping their original relative order.
    pub fn filter_middlewares<'a, B>(
        obj: &T,
        middlewares: &'a [Middleware<B>],
    ) -> Vec<&'a Middleware<B>> {
        if obj.is_globally_filterable() {
            return middlewares.iter().collect();
        }

        let identifiers: Vec<String> = middlewares
            .iter()
            .map(|middleware| middleware.identifier().to_owned())
            .collect();
        let allowed = filter::filter(obj, identifiers);

        let globals = middlewares.iter().filter(|m| m.is_global());
        let filtered = middlewares.iter().filter(|middleware| {
            !middleware.is_global() && allowed.iter().any(|id| id == middleware.identifier())
        });
        let selected: Vec<&Middleware<B>> = globals.chain(filtered).collect();

        tracing::trace!(
            total = middlewares.len(),
            selected = selected.len(),
            "filtered middlewares"
        );
        selected
    }

    /// Transforms applicable to `obj`.
    pub fn filter_transforms(&self, obj: &T) -> Vec<&Middleware<Transformer<T>>> {
        Self::filter_middlewares(obj, &self.transforms)
    }

    /// Side effects applicable to `obj`.
    pub fn filter_side_effects(&self, obj: &T) -> Vec<&Middleware<SideEffect<T>>> {
        Self::filter_middlewares(obj, &self.side_effects)
    }

    /// Apply the applicable transforms to `obj`.
    pub async fn apply_transformers(&self, obj: T) -> StageResult<T> {
        let selected: Vec<Transformer<T>> = self
            .filter_transforms(&obj)
            .into_iter()
            .map(|middleware| Arc::clone(middleware.behavior()))
            .collect();
        middleware::apply_transformers(Ok(obj), &selected).await
    }

    /// Apply the applicable side effects to `obj`. Failures propagate.
    pub fn apply_side_effects(&self, obj: &T) -> StageResult<()> {
        let selected: Vec<SideEffect<T>> = self
            .filter_side_effects(obj)
            .into_iter()
            .map(|middleware| Arc::clone(middleware.behavior()))
            .collect();
        middleware::run_side_effects(obj, &selected)
    }

    /// Apply transforms, then side effects on the transformed value.
    ///
    /// The first failure at either stage short-circuits; side effects already
    /// executed are not undone.
    pub async fn apply_middlewares(&self, obj: T) -> StageResult<T> {
        let transformed = self.apply_transformers(obj).await?;
        self.apply_side_effects(&transformed)?;
        Ok(transformed)
    }
}

/// Builder for [`MiddlewareRegistry`].
pub struct MiddlewareRegistryBuilder<T> {
    registry: MiddlewareRegistry<T>,
}

impl<T: Filterable<String>> MiddlewareRegistryBuilder<T> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            registry: MiddlewareRegistry::default(),
        }
    }

    /// Replace the transform list.
    pub fn with_transforms(mut self, transforms: Vec<Middleware<Transformer<T>>>) -> Self {
        self.registry.transforms = transforms;
        self
    }

    /// Append a named transform.
    pub fn add_transform(
        mut self,
        identifier: impl Into<String>,
        transform: impl Fn(T) -> StageOutcome<T> + Send + Sync + 'static,
    ) -> Self {
        self.registry
            .transforms
            .push(Middleware::new(identifier, middleware::transformer(transform)));
        self
    }

    /// Append a transform under the reserved global identifier.
    pub fn add_global_transform(
        self,
        transform: impl Fn(T) -> StageOutcome<T> + Send + Sync + 'static,
    ) -> Self {
        self.add_transform(GLOBAL_MIDDLEWARE, transform)
    }

    /// Replace the side-effect list.
    pub fn with_side_effects(mut self, side_effects: Vec<Middleware<SideEffect<T>>>) -> Self {
        self.registry.side_effects = side_effects;
        self
    }

    /// Append a named side effect.
    pub fn add_side_effect(
        mut self,
        identifier: impl Into<String>,
        effect: impl Fn(&T) -> StageResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.registry
            .side_effects
            .push(Middleware::new(identifier, middleware::side_effect(effect)));
        self
    }

    /// Append a side effect under the reserved global identifier.
    pub fn add_global_side_effect(
        self,
        effect: impl Fn(&T) -> StageResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.add_side_effect(GLOBAL_MIDDLEWARE, effect)
    }

    /// Copy all middlewares from an existing registry.
    pub fn with_buildable(mut self, other: &MiddlewareRegistry<T>) -> Self {
        self.registry = other.clone();
        self
    }

    /// Freeze the registry.
    pub fn build(self) -> MiddlewareRegistry<T> {
        self.registry
    }
}

impl<T: Filterable<String>> Default for MiddlewareRegistryBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
