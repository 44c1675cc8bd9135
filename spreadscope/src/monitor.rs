//! Out-of-band dump requests
//!
//! A report can be demanded while the process is running, typically via an
//! OS signal (`SIGUSR1` by default). Emitting from inside a signal handler
//! would run non-async-signal-safe work (locking the stats mutex, buffered
//! output) concurrently with arbitrary interrupted code, so the handler does
//! exactly one thing: store an atomic flag. A dedicated, always-running
//! monitor thread polls that flag and performs the actual emission. The
//! same thread drives optional periodic emission.

#![allow(unsafe_code)] // sigaction requires unsafe

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::tick;
use log::{debug, warn};

use crate::domain::ProfilerError;
use crate::registry::Profiler;

/// Set by the signal handler (or [`request_dump`]); drained by the monitor
/// thread.
static DUMP_REQUESTED: AtomicBool = AtomicBool::new(false);

/// How often the monitor thread checks for a pending dump request.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Request a report from Rust code, equivalent to receiving the dump signal.
///
/// Fire-and-forget: the emission happens on the monitor thread.
pub fn request_dump() {
    DUMP_REQUESTED.store(true, Ordering::Release);
}

/// Whether a dump request is pending and not yet picked up.
#[must_use]
pub fn dump_pending() -> bool {
    DUMP_REQUESTED.load(Ordering::Acquire)
}

/// Consume a pending dump request, if any.
pub(crate) fn take_dump_request() -> bool {
    DUMP_REQUESTED.swap(false, Ordering::AcqRel)
}

extern "C" fn dump_signal_handler(_signum: libc::c_int) {
    // Only async-signal-safe work is permitted here: a single atomic store.
    DUMP_REQUESTED.store(true, Ordering::Release);
}

/// Install the dump signal handler for `signal`.
///
/// # Errors
/// Returns an error if `sigaction` rejects the signal.
pub fn install_dump_signal(signal: libc::c_int) -> Result<(), ProfilerError> {
    // SAFETY: the handler is async-signal-safe (one atomic store) and the
    // sigaction struct is fully initialized before the call.
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = dump_signal_handler as libc::sighandler_t;
        // SA_RESTART keeps interrupted syscalls in the host application
        // restartable instead of surfacing spurious EINTR.
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);
        if libc::sigaction(signal, &action, std::ptr::null_mut()) != 0 {
            return Err(ProfilerError::SignalHandlerFailed {
                signal,
                source: std::io::Error::last_os_error(),
            });
        }
    }
    debug!("dump signal handler installed for signal {signal}");
    Ok(())
}

/// Spawn the monitor thread serving `profiler` for the process lifetime.
pub(crate) fn spawn_monitor(
    profiler: &'static Profiler,
    periodic: Option<Duration>,
) -> Result<(), ProfilerError> {
    std::thread::Builder::new()
        .name("spreadscope-monitor".to_string())
        .spawn(move || monitor_loop(profiler, periodic))
        .map(|_| ())
        .map_err(ProfilerError::MonitorSpawnFailed)
}

fn monitor_loop(profiler: &'static Profiler, periodic: Option<Duration>) {
    let ticker = tick(POLL_INTERVAL);
    let mut last_periodic = Instant::now();

    loop {
        if ticker.recv().is_err() {
            warn!("monitor ticker closed; stopping monitor thread");
            break;
        }
        if take_dump_request() {
            debug!("dump requested; emitting report");
            profiler.emit();
        }
        if let Some(interval) = periodic {
            if last_periodic.elapsed() >= interval {
                last_periodic = Instant::now();
                profiler.emit();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_then_take_drains_the_flag() {
        // The flag is process-global; leave it drained for other tests.
        request_dump();
        assert!(dump_pending());
        assert!(take_dump_request());
        assert!(!dump_pending());
        assert!(!take_dump_request(), "second take must see no pending request");
    }
}
