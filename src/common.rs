//! poison-recovering wrappers around the std monitor primitives.
//!
//! every critical section in this crate either completes its mutation or
//! leaves the counters untouched, so a caller panicking while holding the
//! lock (inside `clone` or a destination's drop) cannot leave a container in
//! a state the invariants forbid. recovering the guard from a poisoned mutex
//! is therefore sound, and it keeps the containers usable after a panic in
//! an unrelated thread.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// acquire the lock, recovering the guard if a previous holder panicked.
#[inline]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// block on the condition, recovering the guard on poison.
#[inline]
pub(crate) fn wait<'a, T>(cond: &Condvar, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
    cond.wait(guard).unwrap_or_else(PoisonError::into_inner)
}

/// block on the condition for at most `timeout`, recovering the guard on
/// poison. callers re-check their predicate and their deadline after every
/// return, so the timed-out flag is not propagated.
#[inline]
pub(crate) fn wait_timeout<'a, T>(
    cond: &Condvar,
    guard: MutexGuard<'a, T>,
    timeout: Duration,
) -> MutexGuard<'a, T> {
    let (guard, _) = cond
        .wait_timeout(guard, timeout)
        .unwrap_or_else(PoisonError::into_inner);
    guard
}
