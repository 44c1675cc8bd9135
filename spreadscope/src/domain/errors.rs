//! Structured error types for spreadscope
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! These errors surface only from installation and setup paths; the hook
//! surface itself has no fatal error category.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfilerError {
    #[error("profiler already installed with a different trigger")]
    AlreadyInstalled,

    #[error("failed to install dump signal handler for signal {signal}: {source}")]
    SignalHandlerFailed { signal: i32, source: std::io::Error },

    #[error("failed to spawn monitor thread: {0}")]
    MonitorSpawnFailed(#[source] std::io::Error),

    #[error("failed to read symbols from {path}: {reason}")]
    SymbolTableUnavailable { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
