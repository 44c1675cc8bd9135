#![allow(unsafe_code)] // dladdr requires unsafe

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CStr;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use object::{Object, ObjectSymbol, SymbolKind};
use rustc_demangle::demangle;

use crate::domain::{FnAddr, ProfilerError};

/// Resolver mapping function addresses to human-readable names.
///
/// Includes a cache to avoid re-resolving the same addresses repeatedly;
/// a report re-emitted later (periodic or signal-driven) mostly re-ranks
/// functions it has already named.
pub struct SymbolResolver {
    table: Option<SymbolTable>,
    /// Cache of resolved names by address.
    cache: RefCell<HashMap<FnAddr, String>>,
}

impl SymbolResolver {
    /// Build a resolver for the current executable.
    ///
    /// Failure to load the symbol table is non-fatal: the resolver degrades
    /// to `dladdr` plus the raw-address fallback.
    #[must_use]
    pub fn new() -> Self {
        let table = match SymbolTable::for_current_exe() {
            Ok(table) => {
                debug!("loaded {} function symbols (load bias 0x{:x})", table.symbols.len(), table.bias);
                Some(table)
            }
            Err(e) => {
                warn!("symbol table unavailable, falling back to dladdr: {e}");
                None
            }
        };
        Self { table, cache: RefCell::new(HashMap::new()) }
    }

    /// Resolve `func` to a name, or its raw address if no name is known.
    pub fn resolve(&self, func: FnAddr) -> String {
        if let Some(hit) = self.cache.borrow().get(&func) {
            return hit.clone();
        }
        let name = self.resolve_uncached(func);
        self.cache.borrow_mut().insert(func, name.clone());
        name
    }

    fn resolve_uncached(&self, func: FnAddr) -> String {
        if let Some(name) = self.table.as_ref().and_then(|table| table.lookup(func.0 as u64)) {
            return format!("{:#}", demangle(name));
        }
        if let Some(name) = dladdr_name(func) {
            return format!("{:#}", demangle(&name));
        }
        func.to_string()
    }
}

impl Default for SymbolResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Function symbols of the current executable, sorted by address.
struct SymbolTable {
    /// Runtime load bias to subtract before lookup; 0 for fixed-address
    /// executables.
    bias: u64,
    symbols: Vec<SymbolEntry>,
}

struct SymbolEntry {
    addr: u64,
    size: u64,
    name: String,
}

impl SymbolTable {
    fn for_current_exe() -> Result<Self, ProfilerError> {
        let exe = std::env::current_exe()?;
        let data = fs::read(&exe)?;
        let obj = object::File::parse(&*data).map_err(|e| ProfilerError::SymbolTableUnavailable {
            path: exe.display().to_string(),
            reason: e.to_string(),
        })?;

        // Position-independent executables are relocated at load time;
        // symbol addresses in the file are offsets from the load base.
        let bias = if obj.kind() == object::ObjectKind::Dynamic { exe_load_base(&exe)? } else { 0 };

        let mut symbols: Vec<SymbolEntry> = obj
            .symbols()
            .filter(|symbol| symbol.kind() == SymbolKind::Text)
            .filter_map(|symbol| {
                let name = symbol.name().ok()?;
                if name.is_empty() || symbol.address() == 0 {
                    return None;
                }
                Some(SymbolEntry { addr: symbol.address(), size: symbol.size(), name: name.to_string() })
            })
            .collect();
        symbols.sort_unstable_by_key(|symbol| symbol.addr);

        Ok(Self { bias, symbols })
    }

    /// Name of the symbol whose range contains `runtime_addr`, if any.
    fn lookup(&self, runtime_addr: u64) -> Option<&str> {
        let addr = runtime_addr.checked_sub(self.bias)?;
        let idx = self.symbols.partition_point(|symbol| symbol.addr <= addr).checked_sub(1)?;
        let symbol = &self.symbols[idx];
        // Zero-sized symbols (assembly stubs) only match exactly.
        let within =
            if symbol.size == 0 { symbol.addr == addr } else { addr < symbol.addr + symbol.size };
        within.then_some(symbol.name.as_str())
    }
}

/// Lowest mapped address of the current executable, from `/proc/self/maps`.
fn exe_load_base(exe: &Path) -> Result<u64, ProfilerError> {
    let maps = fs::read_to_string("/proc/self/maps")?;
    let needle = exe.to_string_lossy();

    let mut base: Option<u64> = None;
    for line in maps.lines() {
        if !line.contains(needle.as_ref()) {
            continue;
        }
        // Line format: "start-end perms offset dev inode pathname"
        if let Some(start) =
            line.split('-').next().and_then(|s| u64::from_str_radix(s, 16).ok())
        {
            base = Some(base.map_or(start, |b: u64| b.min(start)));
        }
    }

    base.ok_or_else(|| ProfilerError::SymbolTableUnavailable {
        path: needle.into_owned(),
        reason: "executable not present in /proc/self/maps".to_string(),
    })
}

/// Best-effort dynamic-symbol lookup via `dladdr`.
fn dladdr_name(func: FnAddr) -> Option<String> {
    let mut info = libc::Dl_info {
        dli_fname: std::ptr::null(),
        dli_fbase: std::ptr::null_mut(),
        dli_sname: std::ptr::null(),
        dli_saddr: std::ptr::null_mut(),
    };
    // SAFETY: dladdr only inspects the address and writes `info`; a zero
    // return or null dli_sname means no symbol was found.
    let rc = unsafe { libc::dladdr(func.0 as *const libc::c_void, &mut info) };
    if rc == 0 || info.dli_sname.is_null() {
        return None;
    }
    // SAFETY: dli_sname points at a NUL-terminated string owned by the
    // dynamic loader; it outlives this call.
    let name = unsafe { CStr::from_ptr(info.dli_sname) };
    Some(name.to_string_lossy().into_owned())
}
