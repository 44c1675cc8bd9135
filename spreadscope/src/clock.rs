//! Monotonic nanosecond clock
//!
//! Timestamps come from `CLOCK_MONOTONIC`, which is immune to wall-clock
//! adjustments. Durations are differences of two such timestamps.

#![allow(unsafe_code)] // clock_gettime requires unsafe
#![allow(clippy::cast_sign_loss)] // timespec fields are non-negative for CLOCK_MONOTONIC

/// Current monotonic time in nanoseconds since an unspecified epoch.
#[must_use]
pub fn now_ns() -> u64 {
    let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
    // SAFETY: `ts` is a valid out-pointer and CLOCK_MONOTONIC is always
    // available on Linux. On failure `ts` stays zeroed.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
    debug_assert_eq!(rc, 0, "clock_gettime(CLOCK_MONOTONIC) failed");
    (ts.tv_sec as u64) * 1_000_000_000 + (ts.tv_nsec as u64)
}
