//! Filter predicates and the `Filterable` capability.
//!
//! A [`Filterable`] value declares which middlewares apply to it through two
//! predicate sets over middleware identifiers: inclusive filters (a candidate
//! must satisfy all of them) and exclusive filters (a candidate matching any
//! of them is dropped). Inclusive filters, when present, take priority and
//! make the exclusive set irrelevant.

use std::sync::Arc;

/// A pure predicate over a candidate value.
pub type Filter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Build a [`Filter`] from a closure.
pub fn predicate<T>(keep: impl Fn(&T) -> bool + Send + Sync + 'static) -> Filter<T> {
    Arc::new(keep)
}

/// Capability exposed by any value that middlewares may be applied to.
///
/// The defaults declare no filters at all, which lets every candidate pass.
/// Override [`Filterable::is_globally_filterable`] to opt out of filtering
/// entirely; this is an explicit capability check rather than a structural
/// one, so only types that deliberately claim the capability get the bypass.
pub trait Filterable<T> {
    /// Inclusive filters. When `Some`, only candidates satisfying every
    /// filter are kept and the exclusive set is ignored.
    fn inclusive_filters(&self) -> Option<&[Filter<T>]> {
        None
    }

    /// Exclusive filters. Candidates satisfying any filter are dropped.
    /// Consulted only when [`Filterable::inclusive_filters`] is `None`.
    fn exclusive_filters(&self) -> &[Filter<T>] {
        &[]
    }

    /// Whether this value bypasses all filtering.
    fn is_globally_filterable(&self) -> bool {
        false
    }
}

/// Filter candidates against a filterable's declared predicate sets.
///
/// Pure and deterministic given pure filters; an empty candidate list yields
/// an empty result regardless of the filter sets.
pub fn filter<T, F>(filterable: &F, candidates: impl IntoIterator<Item = T>) -> Vec<T>
where
    F: Filterable<T> + ?Sized,
{
    if let Some(filters) = filterable.inclusive_filters() {
        candidates
            .into_iter()
            .filter(|candidate| filters.iter().all(|keep| keep(candidate)))
            .collect()
    } else {
        let drops = filterable.exclusive_filters();
        candidates
            .into_iter()
            .filter(|candidate| !drops.iter().any(|drop| drop(candidate)))
            .collect()
    }
}
