//! Engine-level scenarios driven through the public `Profiler` surface.
//!
//! Each test builds a standalone profiler (no global install), so the
//! process-wide slot, signal handler, and monitor thread stay untouched.

use spreadscope::profiling::{thread_stack_depth, StatsAggregator};
use spreadscope::report::rank_by_spread;
use spreadscope::{CallSite, ExclusionFilter, FnAddr, Profiler, ProfilerConfig};

const TRIGGER: FnAddr = FnAddr(0x7000);
const FN_A: FnAddr = FnAddr(0x7100);
const FN_B: FnAddr = FnAddr(0x7200);
const CS: CallSite = CallSite(0);

/// A standalone profiler whose trigger leaves no frame behind, so stack
/// depth assertions start from zero.
fn armed_profiler() -> Profiler {
    let profiler = Profiler::new(
        ProfilerConfig::new(TRIGGER)
            .dump_signal(None)
            .exclusion(ExclusionFilter::from_addresses([TRIGGER])),
    );
    // The gate observes the trigger before the exclusion check, so an
    // excluded trigger still arms recording.
    profiler.on_enter(TRIGGER, CS);
    assert!(profiler.is_armed());
    profiler
}

/// Enough work that enter and exit see different clock readings.
fn busy_spin() {
    let mut acc = 0u64;
    for i in 0..5_000u64 {
        acc = acc.wrapping_add(std::hint::black_box(i).wrapping_mul(31));
    }
    std::hint::black_box(acc);
}

#[test]
fn nested_calls_record_positive_durations_and_empty_the_stack() {
    let profiler = armed_profiler();

    profiler.on_enter(FN_A, CS);
    profiler.on_enter(FN_B, CS);
    busy_spin();
    profiler.on_exit(FN_B, CS);
    busy_spin();
    profiler.on_exit(FN_A, CS);

    assert_eq!(thread_stack_depth(), 0, "stack must be empty after matched exits");

    let snapshot = profiler.snapshot();
    let a = snapshot[&FN_A];
    let b = snapshot[&FN_B];
    assert_eq!(a.count, 1);
    assert_eq!(b.count, 1);
    assert!(a.min_ns > 0, "outer duration must be positive");
    assert!(b.min_ns > 0, "inner duration must be positive");
    assert!(a.min_ns >= b.min_ns, "outer call encloses the inner call");
}

#[test]
fn mismatched_exit_recovers_and_drops_abandoned_frames() {
    let profiler = armed_profiler();

    // Simulates a non-local jump out of B straight back through A.
    profiler.on_enter(FN_A, CS);
    profiler.on_enter(FN_B, CS);
    profiler.on_exit(FN_A, CS);

    assert_eq!(thread_stack_depth(), 0, "recovery must pop through the abandoned frame");

    let snapshot = profiler.snapshot();
    assert_eq!(snapshot[&FN_A].count, 1);
    assert!(!snapshot.contains_key(&FN_B), "abandoned call must not be recorded");
}

#[test]
fn exit_without_any_matching_frame_is_a_noop() {
    let profiler = armed_profiler();

    profiler.on_exit(FN_A, CS);

    assert_eq!(thread_stack_depth(), 0);
    assert!(profiler.snapshot().is_empty());
}

#[test]
fn exclusion_is_absolute_regardless_of_arming() {
    let profiler = Profiler::new(
        ProfilerConfig::new(TRIGGER)
            .dump_signal(None)
            .exclusion(ExclusionFilter::from_addresses([TRIGGER, FN_B])),
    );

    // Before arming.
    profiler.on_enter(FN_B, CS);
    profiler.on_exit(FN_B, CS);

    // After arming.
    profiler.on_enter(TRIGGER, CS);
    profiler.on_enter(FN_B, CS);
    profiler.on_exit(FN_B, CS);

    assert_eq!(thread_stack_depth(), 0, "excluded functions must never push a frame");
    assert!(!profiler.snapshot().contains_key(&FN_B));
}

#[test]
fn gate_latches_for_all_threads() {
    let profiler = armed_profiler();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let profiler = &profiler;
            scope.spawn(move || {
                // Observing unrelated functions never disarms.
                profiler.on_enter(FN_A, CS);
                busy_spin();
                profiler.on_exit(FN_A, CS);
                assert!(profiler.is_armed());
            });
        }
    });

    assert!(profiler.is_armed());
    assert_eq!(profiler.snapshot()[&FN_A].count, 4);
}

#[test]
fn concurrent_threads_keep_independent_stacks() {
    let profiler = armed_profiler();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let profiler = &profiler;
            scope.spawn(move || {
                for _ in 0..100 {
                    profiler.on_enter(FN_A, CS);
                    profiler.on_enter(FN_B, CS);
                    busy_spin();
                    profiler.on_exit(FN_B, CS);
                    profiler.on_exit(FN_A, CS);
                }
                assert_eq!(thread_stack_depth(), 0);
            });
        }
    });

    let snapshot = profiler.snapshot();
    assert_eq!(snapshot[&FN_A].count, 800, "no update may be lost across threads");
    assert_eq!(snapshot[&FN_B].count, 800);
    assert!(snapshot[&FN_A].min_ns <= snapshot[&FN_A].max_ns);
}

#[test]
fn spread_ranking_orders_synthetic_aggregates() {
    let stats = StatsAggregator::new();
    stats.record(FnAddr(0x1), 10); // spread 0

    stats.record(FnAddr(0x2), 5); // spread 45
    stats.record(FnAddr(0x2), 50);

    stats.record(FnAddr(0x3), 100); // spread 10
    stats.record(FnAddr(0x3), 110);

    let rows = rank_by_spread(&stats.snapshot());
    let ranked: Vec<FnAddr> = rows.iter().map(|row| row.func).collect();
    assert_eq!(ranked, vec![FnAddr(0x2), FnAddr(0x3), FnAddr(0x1)]);
    assert_eq!(rows[0].spread_ns, 45);
    assert_eq!(rows[1].spread_ns, 10);
    assert_eq!(rows[2].spread_ns, 0);
}

#[test]
fn report_lists_functions_by_spread() {
    let profiler = armed_profiler();

    for _ in 0..3 {
        profiler.on_enter(FN_A, CS);
        busy_spin();
        profiler.on_exit(FN_A, CS);
    }

    let mut out = Vec::new();
    profiler.emit_to(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("=== Top 1 functions by (max_duration - min_duration) [ns] ==="));
    assert!(text.contains("0x7100"), "unresolved address expected in report:\n{text}");

    // Emission must not consume or mutate the stats.
    assert_eq!(profiler.snapshot()[&FN_A].count, 3);
}
