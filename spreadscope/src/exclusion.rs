//! Exclusion predicate consumed on the hot path
//!
//! The profiler is told which functions to skip by an externally supplied
//! predicate keyed on function address. Construction of that predicate
//! (symbol extraction, pattern rules) happens offline; this module only
//! models the consumed interface. Lookups run on every non-guarded
//! enter/exit, so the address-list form uses a sorted slice with binary
//! search rather than any linear scan.

use std::fmt;

use crate::domain::FnAddr;

/// Decides whether a given function must be skipped by the profiler.
pub struct ExclusionFilter {
    kind: FilterKind,
}

enum FilterKind {
    /// Nothing excluded.
    None,
    /// Sorted, deduplicated address list; O(log n) membership.
    Addresses(Vec<usize>),
    /// Arbitrary predicate, e.g. a pre-linked C function behind a shim.
    Predicate(Box<dyn Fn(FnAddr) -> bool + Send + Sync>),
}

impl ExclusionFilter {
    /// Filter that excludes nothing.
    #[must_use]
    pub fn none() -> Self {
        Self { kind: FilterKind::None }
    }

    /// Filter backed by an explicit set of excluded function addresses.
    pub fn from_addresses<I: IntoIterator<Item = FnAddr>>(addresses: I) -> Self {
        let mut addresses: Vec<usize> = addresses.into_iter().map(|a| a.0).collect();
        addresses.sort_unstable();
        addresses.dedup();
        Self { kind: FilterKind::Addresses(addresses) }
    }

    /// Filter backed by a caller-supplied predicate.
    ///
    /// The predicate runs on the hot path and must be cheap.
    pub fn predicate<F>(is_excluded: F) -> Self
    where
        F: Fn(FnAddr) -> bool + Send + Sync + 'static,
    {
        Self { kind: FilterKind::Predicate(Box::new(is_excluded)) }
    }

    /// Whether `func` must be skipped entirely.
    #[must_use]
    pub fn is_excluded(&self, func: FnAddr) -> bool {
        match &self.kind {
            FilterKind::None => false,
            FilterKind::Addresses(addresses) => addresses.binary_search(&func.0).is_ok(),
            FilterKind::Predicate(is_excluded) => is_excluded(func),
        }
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for ExclusionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FilterKind::None => f.write_str("ExclusionFilter::None"),
            FilterKind::Addresses(addresses) => {
                write!(f, "ExclusionFilter::Addresses({} entries)", addresses.len())
            }
            FilterKind::Predicate(_) => f.write_str("ExclusionFilter::Predicate"),
        }
    }
}
