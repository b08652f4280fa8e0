//! Uniform error wrapper routed through error middlewares.

use std::fmt;

use crate::error::DynError;
use crate::filter::Filterable;

/// Carries an optional request description alongside the original failure.
///
/// Holders are created fresh per failed request, immutable after
/// construction, and always globally filterable so error middleware
/// filtering never excludes them. Rebuilding through
/// [`ErrorHolder::clone_builder`] copies both fields and lets the caller
/// override the description independently of the wrapped cause.
#[derive(Debug, Clone, Default)]
pub struct ErrorHolder {
    request_description: Option<String>,
    original: Option<DynError>,
}

impl ErrorHolder {
    /// Start building a holder.
    pub fn builder() -> ErrorHolderBuilder {
        ErrorHolderBuilder::new()
    }

    /// Start a builder pre-populated with this holder's fields.
    pub fn clone_builder(&self) -> ErrorHolderBuilder {
        Self::builder().with_buildable(self)
    }

    /// Description of the request this failure came from, if known.
    pub fn request_description(&self) -> Option<&str> {
        self.request_description.as_deref()
    }

    /// The wrapped cause, if any.
    pub fn original(&self) -> Option<&DynError> {
        self.original.as_ref()
    }

    /// The wrapped cause's message, or empty when no cause is held.
    pub fn message(&self) -> String {
        self.original
            .as_ref()
            .map(|err| err.to_string())
            .unwrap_or_default()
    }
}

impl fmt::Display for ErrorHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.request_description, &self.original) {
            (Some(description), Some(original)) => write!(f, "{description}: {original}"),
            (Some(description), None) => write!(f, "{description}"),
            (None, Some(original)) => write!(f, "{original}"),
            (None, None) => write!(f, "unspecified request error"),
        }
    }
}

impl std::error::Error for ErrorHolder {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.original
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

impl Filterable<String> for ErrorHolder {
    fn is_globally_filterable(&self) -> bool {
        true
    }
}

/// Builder for [`ErrorHolder`].
#[derive(Default)]
pub struct ErrorHolderBuilder {
    holder: ErrorHolder,
}

impl ErrorHolderBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request description.
    pub fn with_request_description(mut self, description: impl Into<String>) -> Self {
        self.holder.request_description = Some(description.into());
        self
    }

    /// Set or clear the request description.
    pub fn with_maybe_description(mut self, description: Option<String>) -> Self {
        self.holder.request_description = description;
        self
    }

    /// Set the original error.
    pub fn with_original(mut self, original: DynError) -> Self {
        self.holder.original = Some(original);
        self
    }

    /// Copy both fields from an existing holder.
    pub fn with_buildable(mut self, other: &ErrorHolder) -> Self {
        self.holder = other.clone();
        self
    }

    /// Freeze the holder.
    pub fn build(self) -> ErrorHolder {
        self.holder
    }
}
