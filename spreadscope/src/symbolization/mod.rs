//! # Symbol Resolution
//!
//! The stats table keys functions by raw address. Addresses like
//! `0x55f3a2b4c780` are meaningless to humans, so at report time each one is
//! translated to a function name. Resolution is strictly best-effort: a
//! failure at every stage falls back to printing the raw address, never an
//! empty or malformed string.
//!
//! ## Resolution chain
//!
//! 1. **ELF symbol table** of the current executable, read once and lazily
//!    via the `object` crate. Covers non-exported functions, which is where
//!    most instrumented code lives. Position-independent executables are
//!    handled by subtracting the load base parsed from `/proc/self/maps`
//!    (runtime address = load base + ELF virtual address).
//! 2. **`dladdr`** for addresses outside the main executable's symbol
//!    table, e.g. shared-library functions exported through the dynamic
//!    symbol table.
//! 3. **Raw address** (`0x{addr:x}`) as the fallback of last resort.
//!
//! Names are demangled with `rustc-demangle`; non-Rust names pass through
//! unchanged.
//!
//! Resolution happens only at report time, never on the hot path, and
//! resolved names are cached per resolver.

pub mod symbolizer;

pub use symbolizer::SymbolResolver;
