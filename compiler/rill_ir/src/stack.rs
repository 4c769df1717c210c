//! Stack growth for recursive tree walks.
//!
//! Generated code can nest blocks far deeper than hand-written code does.
//! Walkers wrap each recursion step in [`ensure_sufficient_stack`], which
//! grows the stack on native targets and is a passthrough on WASM.

/// Remaining stack below which the walk switches to a fresh segment.
const RED_ZONE: usize = 64 * 1024;

/// Size of each additional stack segment.
const STACK_SEGMENT: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
