//! Process-wide stats table
//!
//! The only structure shared across threads. All mutation goes through a
//! single mutex around one map update, so concurrent `record` calls never
//! lose an update or tear an entry. min/max/count are commutative and
//! associative, so interleaving order does not affect the final aggregate.
//!
//! The lock is recovered from poisoning: a panic elsewhere in the process
//! must not turn recording into a second panic source.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::domain::{FnAddr, FnStats};

/// Mapping from function identity to running {min, max, count}.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    table: Mutex<HashMap<FnAddr, FnStats>>,
}

impl StatsAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one completed call of `func` into the table.
    pub fn record(&self, func: FnAddr, duration_ns: u64) {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        match table.entry(func) {
            Entry::Occupied(mut entry) => entry.get_mut().observe(duration_ns),
            Entry::Vacant(entry) => {
                entry.insert(FnStats::first(duration_ns));
            }
        }
    }

    /// Momentary, internally consistent copy of the full table.
    ///
    /// Recordings concurrent with the snapshot either are or are not
    /// visible, but no entry is ever observed half-updated.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<FnAddr, FnStats> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of distinct functions observed so far.
    #[must_use]
    pub fn observed_functions(&self) -> usize {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
