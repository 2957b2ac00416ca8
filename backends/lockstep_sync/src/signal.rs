//! Mutex-guarded value paired with a condition variable.
//!
//! [`SignalGuardedValue`] extends the [`GuardedValue`](crate::GuardedValue) idea with a
//! condition variable owned alongside the mutex. Its [`SignalAccessor`] can suspend the
//! current thread with [`SignalAccessor::wait`], releasing the lock while asleep.
//!
//! `wait` checks no condition and may return spuriously. Callers always re-test their
//! predicate in a loop, or use [`SignalAccessor::wait_until`] which does it for them:
//!
//! ```
//! use lockstep_sync::SignalGuardedValue;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let ready = Arc::new(SignalGuardedValue::new(false));
//!
//! let setter = Arc::clone(&ready);
//! let handle = thread::spawn(move || {
//!     *setter.scoped_access() = true;
//!     setter.notify_all();
//! });
//!
//! let mut access = ready.scoped_access();
//! while !*access {
//!     access = access.wait();
//! }
//! drop(access);
//! handle.join().unwrap();
//! ```

use core::fmt;
use core::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError, TryLockError};

/// A value reachable only through a mutex, with a condition variable for signaling.
pub struct SignalGuardedValue<T> {
    data: Mutex<T>,
    signal: Condvar,
}

/// Scoped handle holding the lock of a [`SignalGuardedValue`].
///
/// Holding a `SignalAccessor` is the proof that the lock is held, so
/// [`wait`](Self::wait) can only ever be called with the lock already acquired.
#[must_use = "the lock is released as soon as the accessor is dropped"]
pub struct SignalAccessor<'a, T> {
    guard: MutexGuard<'a, T>,
    signal: &'a Condvar,
}

impl<T> SignalGuardedValue<T> {
    #[inline]
    pub const fn new(data: T) -> Self {
        Self {
            data: Mutex::new(data),
            signal: Condvar::new(),
        }
    }

    /// Blocks until the lock is free and returns an accessor holding it.
    pub fn scoped_access(&self) -> SignalAccessor<'_, T> {
        SignalAccessor {
            guard: self.data.lock().unwrap_or_else(PoisonError::into_inner),
            signal: &self.signal,
        }
    }

    /// Returns an accessor if the lock is free right now, without blocking.
    pub fn try_scoped_access(&self) -> Option<SignalAccessor<'_, T>> {
        let guard = match self.data.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };
        Some(SignalAccessor {
            guard,
            signal: &self.signal,
        })
    }

    /// Wakes every thread suspended in [`SignalAccessor::wait`].
    ///
    /// Woken threads still have to reacquire the lock and re-check their predicate.
    #[inline]
    pub fn notify_all(&self) {
        self.signal.notify_all();
    }

    /// Wakes at most one thread suspended in [`SignalAccessor::wait`].
    #[inline]
    pub fn notify_one(&self) {
        self.signal.notify_one();
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.data.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<'a, T> SignalAccessor<'a, T> {
    /// Atomically releases the lock, suspends until notified, then reacquires the
    /// lock and returns the accessor.
    ///
    /// No condition is checked. The wakeup may be spurious or may arrive before the
    /// state the caller waits for is true, so always call this inside a loop that
    /// re-tests the predicate.
    pub fn wait(self) -> Self {
        let Self { guard, signal } = self;
        let guard = signal.wait(guard).unwrap_or_else(PoisonError::into_inner);
        Self { guard, signal }
    }

    /// Waits until `condition` holds for the protected value.
    ///
    /// The condition is evaluated under the lock before the first wait and after
    /// every wakeup, so it returns as soon as (and only when) the condition is true.
    pub fn wait_until<F>(mut self, mut condition: F) -> Self
    where
        F: FnMut(&T) -> bool,
    {
        while !condition(&self.guard) {
            self = self.wait();
        }
        self
    }
}

impl<T> Deref for SignalAccessor<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for SignalAccessor<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T: fmt::Debug> fmt::Debug for SignalAccessor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: fmt::Debug> fmt::Debug for SignalGuardedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("SignalGuardedValue");
        match self.try_scoped_access() {
            Some(access) => d.field("data", &&*access),
            None => d.field("data", &format_args!("<locked>")),
        };
        d.finish_non_exhaustive()
    }
}

impl<T: Default> Default for SignalGuardedValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    /// WHY: wait must give the lock up while asleep
    /// WHAT: Another thread can take the accessor while the first is waiting
    #[test]
    #[ntest::timeout(5000)]
    fn test_wait_releases_lock_while_suspended() {
        let value = Arc::new(SignalGuardedValue::new(0_u32));

        let waiter_value = Arc::clone(&value);
        let waiter = thread::spawn(move || {
            let access = waiter_value.scoped_access().wait_until(|v| *v == 1);
            *access
        });

        // Keep publishing until the waiter has observed the update.
        loop {
            let mut access = value.scoped_access();
            *access = 1;
            drop(access);
            value.notify_all();
            if waiter.is_finished() {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(waiter.join().unwrap(), 1);
    }

    /// WHY: wait must reacquire the lock before returning
    /// WHAT: While the woken thread holds the returned accessor nobody else can lock
    #[test]
    #[ntest::timeout(5000)]
    fn test_wait_returns_holding_lock() {
        let value = Arc::new(SignalGuardedValue::new(false));
        let observed_exclusive = Arc::new(AtomicBool::new(false));

        let waiter_value = Arc::clone(&value);
        let waiter_flag = Arc::clone(&observed_exclusive);
        let waiter = thread::spawn(move || {
            let access = waiter_value.scoped_access().wait_until(|ready| *ready);
            let exclusive = waiter_value.try_scoped_access().is_none();
            waiter_flag.store(exclusive, Ordering::SeqCst);
            drop(access);
        });

        thread::sleep(Duration::from_millis(20));
        *value.scoped_access() = true;
        value.notify_all();

        waiter.join().unwrap();
        assert!(observed_exclusive.load(Ordering::SeqCst));
    }

    /// WHY: The predicate is the source of truth, not the wakeup
    /// WHAT: Notifications without the predicate becoming true keep the waiter parked
    #[test]
    #[ntest::timeout(5000)]
    fn test_wait_until_ignores_premature_wakeups() {
        let value = Arc::new(SignalGuardedValue::new(0_u32));

        let waiter_value = Arc::clone(&value);
        let waiter = thread::spawn(move || {
            let access = waiter_value.scoped_access().wait_until(|v| *v >= 3);
            *access
        });

        for _ in 0..3 {
            thread::sleep(Duration::from_millis(5));
            *value.scoped_access() += 1;
            value.notify_all();
            // Spurious extra notification.
            value.notify_one();
        }

        assert_eq!(waiter.join().unwrap(), 3);
    }

    /// WHY: An already-true predicate must not block
    /// WHAT: wait_until returns immediately when the condition already holds
    #[test]
    #[ntest::timeout(1000)]
    fn test_wait_until_already_true() {
        let value = SignalGuardedValue::new(7);
        let access = value.scoped_access().wait_until(|v| *v == 7);
        assert_eq!(*access, 7);
    }

    /// WHY: notify_all must wake every waiter
    /// WHAT: Several threads waiting on the same predicate all return
    #[test]
    #[ntest::timeout(5000)]
    fn test_notify_all_wakes_every_waiter() {
        let value = Arc::new(SignalGuardedValue::new(false));

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let value = Arc::clone(&value);
                thread::spawn(move || {
                    let _access = value.scoped_access().wait_until(|open| *open);
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(10));
        *value.scoped_access() = true;
        value.notify_all();

        for waiter in waiters {
            waiter.join().unwrap();
        }
    }
}
