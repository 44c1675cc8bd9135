//! # spreadscope - Function-Call Spread Profiler Runtime
//!
//! spreadscope is a low-overhead, in-process profiling runtime that observes
//! every entry and exit of instrumented functions, pairs each exit with its
//! matching entry on a per-thread call stack, and aggregates per-function
//! minimum, maximum, and count of observed call durations. Reports rank
//! functions by timing *spread* (max − min duration), a heuristic for
//! spotting functions with highly variable cost.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   Instrumented Application                      │
//! │          (compiled with -finstrument-functions, or any          │
//! │           mechanism calling the hooks at fn boundaries)         │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ on_enter / on_exit
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    spreadscope (This Crate)                     │
//! │                                                                 │
//! │  TriggerGate ──▶ ReentryGuard ──▶ ExclusionFilter               │
//! │       │              (per-thread)       │                       │
//! │       ▼                                 ▼                       │
//! │  ┌──────────────┐  pop + duration  ┌──────────────┐             │
//! │  │  CallStack   │─────────────────▶│    Stats     │             │
//! │  │ (per-thread) │                  │  Aggregator  │             │
//! │  └──────────────┘                  └──────┬───────┘             │
//! │                                           │ snapshot            │
//! │  ┌──────────────┐                  ┌──────▼───────┐             │
//! │  │   Symbol     │◀─────────────────│    Report    │──▶ stderr   │
//! │  │   Resolver   │   resolve names  │   Emitter    │             │
//! │  └──────────────┘                  └──────────────┘             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`profiling`]: the core engine
//!   - `call_stack`: per-thread frame stack with mismatched-exit recovery
//!   - `gate`: one-way arming latch keyed on a trigger function
//!   - `reentry`: per-thread guards keeping the profiler out of itself
//!   - `stats`: mutex-protected process-wide {min, max, count} table
//!
//! - [`symbolization`]: best-effort address-to-name resolution
//!   - ELF symbol table of the current executable, `dladdr` fallback,
//!     raw-address fallback of last resort
//!
//! - [`report`]: spread ranking and fixed-width table rendering
//!
//! - [`monitor`]: out-of-band dump requests (signal handler sets a flag,
//!   a dedicated monitor thread performs the emission)
//!
//! - [`registry`]: the process-wide [`Profiler`] object, its configuration,
//!   and the [`install`] entry point
//!
//! - [`ffi`]: `__cyg_profile_func_enter` / `__cyg_profile_func_exit`
//!   exports for binaries built with `-finstrument-functions`
//!
//! - [`domain`]: core domain types ([`FnAddr`], [`CallSite`], [`FnStats`])
//!   and errors
//!
//! ## Recording Lifecycle
//!
//! Recording is gated: nothing is recorded until the configured *trigger*
//! function is observed entering for the first time. The gate is a one-way
//! latch — once armed, recording continues until process exit. Reports are
//! emitted at normal process termination, on an out-of-band dump signal
//! (`SIGUSR1` by default), and optionally on a periodic cadence.
//!
//! ## Typical Usage
//!
//! ```rust,no_run
//! use spreadscope::{install, FnAddr, ProfilerConfig};
//!
//! fn phase_start() {}
//!
//! let trigger = FnAddr(phase_start as usize);
//! let profiler = install(ProfilerConfig::new(trigger)).expect("install profiler");
//! ```
//!
//! ## Safety Properties
//!
//! The hooks never panic into the host, never block beyond one brief map
//! update, and degrade to "skip this call" on any internal failure. The
//! worst-case failure mode is missing profiling data, never a crash of the
//! instrumented process.

pub mod clock;
pub mod domain;
pub mod exclusion;
pub mod ffi;
pub mod monitor;
pub mod profiling;
pub mod registry;
pub mod report;
pub mod symbolization;

pub use domain::{CallSite, FnAddr, FnStats, ProfilerError};
pub use exclusion::ExclusionFilter;
pub use monitor::request_dump;
pub use registry::{global, install, Profiler, ProfilerConfig};
pub use report::SpreadRow;
pub use symbolization::SymbolResolver;
