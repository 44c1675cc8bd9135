//! Trigger gate
//!
//! Recording is inert until a designated trigger function is observed
//! entering for the first time. Profiling every small function from process
//! start would be prohibitively expensive and drown the interesting phase in
//! startup noise; gating on one landmark symbol trades completeness for
//! signal. The gate is a one-way latch: states {UNARMED, ARMED}, ARMED is
//! terminal, there is no disarm.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::FnAddr;

/// Process-wide arming latch keyed on a single trigger function.
#[derive(Debug)]
pub struct TriggerGate {
    trigger: FnAddr,
    armed: AtomicBool,
}

impl TriggerGate {
    #[must_use]
    pub fn new(trigger: FnAddr) -> Self {
        Self { trigger, armed: AtomicBool::new(false) }
    }

    /// Latch armed when `func` is the trigger. Idempotent.
    pub fn observe(&self, func: FnAddr) {
        if func == self.trigger {
            self.armed.store(true, Ordering::Release);
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// The configured trigger identity.
    #[must_use]
    pub fn trigger(&self) -> FnAddr {
        self.trigger
    }
}
