//! Process-wide profiler registry
//!
//! All mutable profiling state lives in one [`Profiler`] object rather than
//! ambient globals. [`install`] places a configured instance in the single
//! process-wide slot, wires the dump signal handler, and starts the monitor
//! thread; the instrumentation hooks in [`crate::ffi`] route through that
//! slot. Standalone instances (without `install`) record and emit but get
//! no signal handler, monitor thread, or exit hook wiring — that keeps them
//! usable in tests without touching process-global facilities.

#![allow(unsafe_code)] // atexit requires unsafe

use std::collections::HashMap;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, Once, OnceLock, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};

use crate::clock;
use crate::domain::{CallSite, FnAddr, FnStats, ProfilerError};
use crate::exclusion::ExclusionFilter;
use crate::monitor;
use crate::profiling::{with_thread_stack, Frame, Phase, ReentryGuard, StatsAggregator, TriggerGate};
use crate::report::{self, DEFAULT_MAX_ROWS};
use crate::symbolization::SymbolResolver;

/// Configuration for a [`Profiler`].
#[derive(Debug)]
pub struct ProfilerConfig {
    trigger: FnAddr,
    exclusion: ExclusionFilter,
    dump_signal: Option<libc::c_int>,
    periodic: Option<Duration>,
    max_rows: usize,
}

impl ProfilerConfig {
    /// Configuration with defaults: no exclusions, `SIGUSR1` dump signal,
    /// no periodic emission, 50 report rows.
    ///
    /// `trigger` is the function whose first observed entry arms recording.
    #[must_use]
    pub fn new(trigger: FnAddr) -> Self {
        Self {
            trigger,
            exclusion: ExclusionFilter::none(),
            dump_signal: Some(libc::SIGUSR1),
            periodic: None,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }

    /// Functions the profiler must skip.
    #[must_use]
    pub fn exclusion(mut self, exclusion: ExclusionFilter) -> Self {
        self.exclusion = exclusion;
        self
    }

    /// Signal that requests an on-demand report, or `None` to disable.
    #[must_use]
    pub fn dump_signal(mut self, signal: Option<libc::c_int>) -> Self {
        self.dump_signal = signal;
        self
    }

    /// Emit a report on this cadence in addition to the other triggers.
    #[must_use]
    pub fn periodic(mut self, interval: Duration) -> Self {
        self.periodic = Some(interval);
        self
    }

    /// Cap on ranked report rows.
    #[must_use]
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}

/// The profiling engine: gate, per-thread stacks, stats table, reporting.
pub struct Profiler {
    gate: TriggerGate,
    stats: StatsAggregator,
    exclusion: ExclusionFilter,
    max_rows: usize,
    exit_hook: Once,
    resolver: OnceLock<Mutex<SymbolResolver>>,
}

impl Profiler {
    /// Build a standalone profiler. No process-global wiring happens here;
    /// see [`install`].
    #[must_use]
    pub fn new(config: ProfilerConfig) -> Self {
        Self {
            gate: TriggerGate::new(config.trigger),
            stats: StatsAggregator::new(),
            exclusion: config.exclusion,
            max_rows: config.max_rows,
            exit_hook: Once::new(),
            resolver: OnceLock::new(),
        }
    }

    /// Hook invoked at every instrumented function entry.
    ///
    /// Never panics into the caller; any internal failure skips this call's
    /// instrumentation.
    pub fn on_enter(&self, func: FnAddr, call_site: CallSite) {
        let _ = call_site; // reserved for caller attribution
        let _ = panic::catch_unwind(AssertUnwindSafe(|| self.enter_impl(func)));
    }

    /// Hook invoked at every instrumented function exit.
    ///
    /// Never panics into the caller; any internal failure skips this call's
    /// instrumentation.
    pub fn on_exit(&self, func: FnAddr, call_site: CallSite) {
        let _ = call_site; // reserved for caller attribution
        let _ = panic::catch_unwind(AssertUnwindSafe(|| self.exit_impl(func)));
    }

    fn enter_impl(&self, func: FnAddr) {
        self.gate.observe(func);

        let Some(_guard) = ReentryGuard::acquire(Phase::Enter) else { return };
        if !self.gate.is_armed() || self.exclusion.is_excluded(func) {
            return;
        }

        self.ensure_exit_hook();
        let start_ns = clock::now_ns();
        let _ = with_thread_stack(|stack| stack.push(Frame { func, start_ns }));
    }

    fn exit_impl(&self, func: FnAddr) {
        // Admission is re-evaluated here rather than replayed from entry
        // time; the gate is monotonic and the exclusion filter fixed, so
        // the only divergence is an exit whose entry predated arming, and
        // that exit finds no frame below.
        let Some(_guard) = ReentryGuard::acquire(Phase::Exit) else { return };
        if !self.gate.is_armed() || self.exclusion.is_excluded(func) {
            return;
        }

        let end_ns = clock::now_ns();
        let Some(Some(frame)) = with_thread_stack(|stack| stack.pop_matching(func)) else {
            return;
        };
        self.stats.record(func, end_ns.saturating_sub(frame.start_ns));
    }

    /// Whether the trigger has been observed and recording is live.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.gate.is_armed()
    }

    /// The configured trigger identity.
    #[must_use]
    pub fn trigger(&self) -> FnAddr {
        self.gate.trigger()
    }

    /// Momentary copy of the stats table.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<FnAddr, FnStats> {
        self.stats.snapshot()
    }

    /// Emit the ranked report to the diagnostic stream.
    pub fn emit(&self) {
        let stderr = io::stderr();
        let mut out = stderr.lock();
        if let Err(e) = self.emit_to(&mut out) {
            warn!("failed to write report: {e}");
        }
    }

    /// Emit the ranked report to an arbitrary writer.
    ///
    /// Reads a snapshot; never mutates the stats table.
    ///
    /// # Errors
    /// Returns an error if writing to `out` fails.
    pub fn emit_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let snapshot = self.stats.snapshot();
        let rows = report::rank_by_spread(&snapshot);
        let resolver = self.resolver.get_or_init(|| Mutex::new(SymbolResolver::new()));
        let resolver = resolver.lock().unwrap_or_else(PoisonError::into_inner);
        report::render(out, &rows, &resolver, self.max_rows)
    }

    /// Register the at-exit report exactly once, on the first admitted
    /// entry. Only the installed global profiler registers; standalone
    /// instances must not print into an unrelated process exit.
    fn ensure_exit_hook(&self) {
        self.exit_hook.call_once(|| {
            if global().is_some_and(|g| std::ptr::eq(g, self)) {
                // SAFETY: report_at_exit is an extern "C" fn with no
                // arguments, exactly what atexit expects.
                let rc = unsafe { libc::atexit(report_at_exit) };
                if rc == 0 {
                    debug!("exit report registered");
                } else {
                    warn!("atexit registration failed; no report at process exit");
                }
            }
        });
    }
}

extern "C" fn report_at_exit() {
    if let Some(profiler) = global() {
        profiler.emit();
    }
}

static GLOBAL: OnceLock<Profiler> = OnceLock::new();

/// Install `config` as the process-wide profiler.
///
/// Idempotent: reinstalling with the same trigger returns the existing
/// instance; a conflicting trigger is an error. On first installation this
/// wires the dump signal handler (if configured) and starts the monitor
/// thread.
///
/// # Errors
/// Returns an error if a profiler with a different trigger is already
/// installed, or if the signal handler or monitor thread cannot be set up.
pub fn install(config: ProfilerConfig) -> Result<&'static Profiler, ProfilerError> {
    let trigger = config.trigger;
    let dump_signal = config.dump_signal;
    let periodic = config.periodic;

    let mut fresh = false;
    let profiler = GLOBAL.get_or_init(|| {
        fresh = true;
        Profiler::new(config)
    });

    if !fresh {
        if profiler.trigger() != trigger {
            return Err(ProfilerError::AlreadyInstalled);
        }
        debug!("profiler already installed; install is idempotent");
        return Ok(profiler);
    }

    if let Some(signal) = dump_signal {
        monitor::install_dump_signal(signal)?;
    }
    monitor::spawn_monitor(profiler, periodic)?;
    info!("profiler installed; recording arms on first entry of {trigger}");
    Ok(profiler)
}

/// The installed process-wide profiler, if any.
#[must_use]
pub fn global() -> Option<&'static Profiler> {
    GLOBAL.get()
}
