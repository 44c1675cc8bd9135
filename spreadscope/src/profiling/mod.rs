//! Profiling core modules
//!
//! The engine pieces that run inside the hook path:
//! - Per-thread call stack with mismatched-exit recovery
//! - One-way trigger gate that arms recording
//! - Per-thread reentry guards keeping the profiler out of itself
//! - The single cross-thread stats table
//!
//! Per-thread state (call stack, reentry flags) is reached only through
//! thread-locals; no cross-thread handle to another thread's stack exists,
//! which is why none of it needs locking. The stats table is the only
//! shared-mutable structure and owns the only mutex in the crate.

pub mod call_stack;
pub mod gate;
pub mod reentry;
pub mod stats;

// Re-export common types
pub use call_stack::{thread_stack_depth, CallStack, Frame};
pub use gate::TriggerGate;
pub use reentry::{Phase, ReentryGuard};
pub use stats::StatsAggregator;

pub(crate) use call_stack::with_thread_stack;
