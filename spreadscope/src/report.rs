//! Spread ranking and report rendering
//!
//! A report is a snapshot of the stats table ranked by timing spread
//! (max − min duration) and rendered as a fixed-width table: rank, resolved
//! name, min, max, spread, call count. The table is human-readable output
//! on the diagnostic stream, not a machine-parsed format.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::io::{self, Write};

use crate::domain::{FnAddr, FnStats};
use crate::symbolization::SymbolResolver;

/// Maximum rows a report prints by default.
pub const DEFAULT_MAX_ROWS: usize = 50;

/// One ranked row of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadRow {
    pub func: FnAddr,
    pub min_ns: u64,
    pub max_ns: u64,
    pub spread_ns: u64,
    pub count: u64,
}

/// Rank a stats snapshot descending by spread.
#[must_use]
pub fn rank_by_spread(snapshot: &HashMap<FnAddr, FnStats>) -> Vec<SpreadRow> {
    let mut rows: Vec<SpreadRow> = snapshot
        .iter()
        .map(|(&func, stats)| SpreadRow {
            func,
            min_ns: stats.min_ns,
            max_ns: stats.max_ns,
            spread_ns: stats.spread_ns(),
            count: stats.count,
        })
        .collect();
    rows.sort_unstable_by_key(|row| Reverse(row.spread_ns));
    rows
}

/// Render up to `max_rows` ranked rows as a fixed-width table.
pub fn render<W: Write>(
    out: &mut W,
    rows: &[SpreadRow],
    resolver: &SymbolResolver,
    max_rows: usize,
) -> io::Result<()> {
    let top = rows.len().min(max_rows);

    writeln!(out)?;
    writeln!(out, "=== Top {top} functions by (max_duration - min_duration) [ns] ===")?;
    writeln!(
        out,
        "{:<4} {:<40} {:>12} {:>12} {:>12} {:>8}",
        "Rank", "Function", "min(ns)", "max(ns)", "spread", "calls"
    )?;

    for (i, row) in rows.iter().take(top).enumerate() {
        let name = resolver.resolve(row.func);
        writeln!(
            out,
            "{:<4} {:<40} {:>12} {:>12} {:>12} {:>8}",
            i + 1,
            name,
            row.min_ns,
            row.max_ns,
            row.spread_ns,
            row.count
        )?;
    }

    writeln!(out, "=============================================================")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_of(entries: &[(FnAddr, FnStats)]) -> HashMap<FnAddr, FnStats> {
        entries.iter().copied().collect()
    }

    #[test]
    fn ranks_descending_by_spread() {
        let snapshot = snapshot_of(&[
            (FnAddr(0x1), FnStats { min_ns: 10, max_ns: 10, count: 1 }),
            (FnAddr(0x2), FnStats { min_ns: 5, max_ns: 50, count: 3 }),
            (FnAddr(0x3), FnStats { min_ns: 100, max_ns: 110, count: 7 }),
        ]);

        let rows = rank_by_spread(&snapshot);
        let order: Vec<(FnAddr, u64)> = rows.iter().map(|r| (r.func, r.spread_ns)).collect();
        assert_eq!(order, vec![(FnAddr(0x2), 45), (FnAddr(0x3), 10), (FnAddr(0x1), 0)]);
    }

    #[test]
    fn render_caps_at_max_rows() {
        let snapshot: HashMap<FnAddr, FnStats> = (0..10u64)
            .map(|i| {
                (FnAddr(0x100 + i as usize), FnStats { min_ns: 1, max_ns: 1 + i, count: 1 })
            })
            .collect();
        let rows = rank_by_spread(&snapshot);
        let resolver = SymbolResolver::new();

        let mut out = Vec::new();
        render(&mut out, &rows, &resolver, 3).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("=== Top 3 functions"));
        assert!(text.contains("\n1    "));
        assert!(text.contains("\n3    "));
        assert!(!text.contains("\n4    "), "must not print past max_rows:\n{text}");
    }

    #[test]
    fn render_contains_header_and_unresolved_addresses() {
        let snapshot =
            snapshot_of(&[(FnAddr(0x1234), FnStats { min_ns: 7, max_ns: 19, count: 2 })]);
        let rows = rank_by_spread(&snapshot);
        let resolver = SymbolResolver::new();

        let mut out = Vec::new();
        render(&mut out, &rows, &resolver, DEFAULT_MAX_ROWS).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Rank"));
        assert!(text.contains("Function"));
        assert!(text.contains("spread"));
        assert!(text.contains("0x1234"), "unresolved function prints its raw address:\n{text}");
        assert!(text.contains("12"), "spread column value missing:\n{text}");
    }

    #[test]
    fn empty_snapshot_renders_header_only() {
        let rows = rank_by_spread(&HashMap::new());
        let resolver = SymbolResolver::new();

        let mut out = Vec::new();
        render(&mut out, &rows, &resolver, DEFAULT_MAX_ROWS).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("=== Top 0 functions"));
    }
}
