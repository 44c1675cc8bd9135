//! C hook surface
//!
//! Binaries compiled with `-finstrument-functions` call
//! `__cyg_profile_func_enter` / `__cyg_profile_func_exit` at every function
//! prologue/epilogue. Linking this crate (staticlib or cdylib) into such a
//! binary provides those symbols and routes them to the installed global
//! profiler. Until [`crate::install`] (or [`spreadscope_install`]) has run,
//! the hooks are inert.
//!
//! The profiler crate itself is not compiled with instrumentation, but the
//! reentry guards still protect these entry points: a host toolchain may
//! interpose on more than it promises.

use std::os::raw::c_void;

use crate::domain::{CallSite, FnAddr};
use crate::exclusion::ExclusionFilter;
use crate::registry::{self, ProfilerConfig};

/// Exclusion predicate supplied by a pre-linked C component.
pub type CExclusionFn = extern "C" fn(func: *const c_void) -> bool;

/// Install the process-wide profiler from C.
///
/// `trigger` is the address of the function whose first entry arms
/// recording; `is_excluded` may be null when nothing is excluded. Returns
/// `true` on success (including an idempotent reinstall).
#[no_mangle]
pub extern "C" fn spreadscope_install(
    trigger: *const c_void,
    is_excluded: Option<CExclusionFn>,
) -> bool {
    let mut config = ProfilerConfig::new(FnAddr::from_ptr(trigger));
    if let Some(predicate) = is_excluded {
        config = config
            .exclusion(ExclusionFilter::predicate(move |func| predicate(func.0 as *const c_void)));
    }
    registry::install(config).is_ok()
}

#[no_mangle]
pub extern "C" fn __cyg_profile_func_enter(this_fn: *mut c_void, call_site: *mut c_void) {
    if let Some(profiler) = registry::global() {
        profiler.on_enter(FnAddr::from_ptr(this_fn), CallSite::from_ptr(call_site));
    }
}

#[no_mangle]
pub extern "C" fn __cyg_profile_func_exit(this_fn: *mut c_void, call_site: *mut c_void) {
    if let Some(profiler) = registry::global() {
        profiler.on_exit(FnAddr::from_ptr(this_fn), CallSite::from_ptr(call_site));
    }
}
