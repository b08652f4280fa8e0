//! The request capability expected by the executor.

use crate::filter::Filterable;

/// A caller-defined request, immutable once built.
///
/// Requests declare their middleware filters through [`Filterable`], a human
/// readable description used when reporting failures, and a retry budget for
/// the perform stage.
pub trait Request: Filterable<String> + Send + Sync {
    /// Description of this request, used to enrich translated errors.
    fn request_description(&self) -> String;

    /// Additional perform attempts allowed after the first failure.
    fn request_retries(&self) -> u32 {
        0
    }
}
