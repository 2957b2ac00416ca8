//! Mutex-guarded value with a scoped accessor.
//!
//! [`GuardedValue`] pairs a mutex with the data it protects so the data can only be
//! reached while the lock is held. The only access path is [`GuardedValue::scoped_access`],
//! which hands out an [`Accessor`] that releases the lock when dropped.

use core::fmt;
use core::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

/// A value of type `T` reachable only through a mutex.
///
/// # Examples
///
/// ```
/// use lockstep_sync::GuardedValue;
///
/// let counter = GuardedValue::new(0_u64);
/// {
///     let mut access = counter.scoped_access();
///     *access += 1;
/// }
/// assert_eq!(*counter.scoped_access(), 1);
/// ```
pub struct GuardedValue<T> {
    data: Mutex<T>,
}

/// Scoped handle granting exclusive access to the value of a [`GuardedValue`].
///
/// The lock is released exactly once, when the accessor is dropped. That holds on
/// every exit path including unwinding. The accessor cannot be cloned or copied.
#[must_use = "the lock is released as soon as the accessor is dropped"]
pub struct Accessor<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T> GuardedValue<T> {
    /// Creates a new, unlocked guarded value.
    #[inline]
    pub const fn new(data: T) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }

    /// Blocks until the lock is free and returns an accessor holding it.
    ///
    /// There is no timeout. The lock is not reentrant: calling this again on the
    /// same thread while an accessor is alive deadlocks.
    ///
    /// A lock poisoned by a panicking holder is recovered, since the accessor
    /// already released it on unwind.
    pub fn scoped_access(&self) -> Accessor<'_, T> {
        Accessor {
            guard: self.data.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Returns an accessor if the lock is free right now, without blocking.
    pub fn try_scoped_access(&self) -> Option<Accessor<'_, T>> {
        match self.data.try_lock() {
            Ok(guard) => Some(Accessor { guard }),
            Err(TryLockError::Poisoned(poisoned)) => Some(Accessor {
                guard: poisoned.into_inner(),
            }),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Returns `true` if a holder panicked while an accessor was alive.
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.data.is_poisoned()
    }

    /// Mutable access without locking, available to the exclusive owner.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consumes the guard and returns the protected value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.data.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Deref for Accessor<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for Accessor<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T: fmt::Debug> fmt::Debug for Accessor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: fmt::Debug> fmt::Debug for GuardedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("GuardedValue");
        match self.try_scoped_access() {
            Some(access) => d.field("data", &&*access),
            None => d.field("data", &format_args!("<locked>")),
        };
        d.finish_non_exhaustive()
    }
}

impl<T: Default> Default for GuardedValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for GuardedValue<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}
