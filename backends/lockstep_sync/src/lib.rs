//! Lock wrappers that pair a mutex with the value it protects.
//!
//! - [`GuardedValue`]: a value behind a mutex, reachable only through a scoped [`Accessor`].
//! - [`SignalGuardedValue`]: the same with a condition variable, whose [`SignalAccessor`]
//!   can suspend until signaled.
//!
//! Both hand out accessors that release the lock when dropped, on every exit path.
//! Neither lock is reentrant.

pub mod guarded;
pub mod signal;

pub use guarded::{Accessor, GuardedValue};
pub use signal::{SignalAccessor, SignalGuardedValue};
