//! Self-profiling demo.
//!
//! An instrumented binary would have its toolchain call the hooks at every
//! function boundary; here the hooks are driven by hand around a couple of
//! workloads with very different cost variability, then the ranked spread
//! report prints to stderr.
//!
//! Run with `RUST_LOG=debug cargo run --example selfprofile` to see the
//! install and monitor diagnostics.

use std::time::Duration;

use anyhow::Result;
use spreadscope::{install, CallSite, FnAddr, ProfilerConfig};

fn fib(n: u64) -> u64 {
    if n < 2 {
        n
    } else {
        fib(n - 1) + fib(n - 2)
    }
}

fn checksum(len: usize) -> u64 {
    (0..len as u64).fold(0u64, |acc, i| acc.wrapping_mul(31).wrapping_add(i))
}

fn main() -> Result<()> {
    env_logger::init();

    let trigger = FnAddr(main as usize);
    let profiler = install(ProfilerConfig::new(trigger))?;

    // In an instrumented binary the toolchain fires this on entry to main.
    profiler.on_enter(trigger, CallSite(0));

    let fib_addr = FnAddr(fib as usize);
    for n in [12, 20, 28] {
        profiler.on_enter(fib_addr, CallSite(0));
        let value = fib(n);
        profiler.on_exit(fib_addr, CallSite(0));
        println!("fib({n}) = {value}");
    }

    let checksum_addr = FnAddr(checksum as usize);
    for len in [100, 1_000_000] {
        profiler.on_enter(checksum_addr, CallSite(0));
        let value = checksum(len);
        profiler.on_exit(checksum_addr, CallSite(0));
        println!("checksum({len}) = {value}");
    }

    profiler.on_exit(trigger, CallSite(0));

    // Ask for an immediate report the way a SIGUSR1 would; the monitor
    // thread picks the request up on its next poll. A second report prints
    // at process exit.
    spreadscope::request_dump();
    std::thread::sleep(Duration::from_millis(300));
    Ok(())
}
