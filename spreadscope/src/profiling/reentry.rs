//! Reentry guards for the hook handlers
//!
//! When the instrumentation mechanism covers the whole binary, the
//! profiler's own helper functions can themselves trigger enter/exit hooks
//! while a handler is already running on the same thread. Two independent
//! per-thread flags — one per handler phase — detect that state; a call
//! arriving while either flag is set is skipped entirely, as if the
//! function were excluded.

use std::cell::Cell;

thread_local! {
    static IN_ENTER: Cell<bool> = const { Cell::new(false) };
    static IN_EXIT: Cell<bool> = const { Cell::new(false) };
}

/// Which hook handler the guard scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Enter,
    Exit,
}

/// RAII marker for one handler invocation on the current thread.
///
/// Acquired at the top of the handler, released when the handler returns.
#[derive(Debug)]
pub struct ReentryGuard {
    phase: Phase,
}

impl ReentryGuard {
    /// Claim the handler for `phase`, or `None` if either handler is
    /// already in progress on this thread.
    ///
    /// A thread whose TLS is being torn down reads as "in progress", so
    /// teardown-time hook invocations are skipped rather than risking a
    /// panic.
    #[must_use]
    pub fn acquire(phase: Phase) -> Option<Self> {
        let enter_busy = IN_ENTER.try_with(Cell::get).unwrap_or(true);
        let exit_busy = IN_EXIT.try_with(Cell::get).unwrap_or(true);
        if enter_busy || exit_busy {
            return None;
        }
        let flag = match phase {
            Phase::Enter => &IN_ENTER,
            Phase::Exit => &IN_EXIT,
        };
        flag.try_with(|cell| cell.set(true)).ok()?;
        Some(Self { phase })
    }
}

impl Drop for ReentryGuard {
    fn drop(&mut self) {
        let flag = match self.phase {
            Phase::Enter => &IN_ENTER,
            Phase::Exit => &IN_EXIT,
        };
        let _ = flag.try_with(|cell| cell.set(false));
    }
}
