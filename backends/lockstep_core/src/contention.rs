//! Lock granularity demo: several threads summing into one shared counter.
//!
//! The locked granularities always produce the full total. Locking once per increment
//! pays for a lock round-trip on every step; accumulating locally and locking once per
//! thread touches the lock a handful of times. The unguarded variant reads and writes
//! the counter as two separate steps, so concurrent threads overwrite each other's
//! increments and the total comes up short.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lockstep_sync::GuardedValue;

use crate::errors::HarnessResult;
use crate::worker::Worker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockGranularity {
    /// No lock: load the counter, then store the incremented value.
    Unguarded,
    /// Acquire the counter's lock for every single increment.
    PerIncrement,
    /// Count in a thread-local variable, then add it under the lock once.
    Batched,
}

impl LockGranularity {
    pub const ALL: [LockGranularity; 3] = [
        LockGranularity::Unguarded,
        LockGranularity::PerIncrement,
        LockGranularity::Batched,
    ];
}

impl core::fmt::Display for LockGranularity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unguarded => write!(f, "no lock"),
            Self::PerIncrement => write!(f, "lock per increment"),
            Self::Batched => write!(f, "local sum, lock once"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentionReport {
    pub granularity: LockGranularity,
    pub total: u64,
    /// `threads * per_thread`, what the total would be with no lost updates.
    pub expected: u64,
    pub elapsed: Duration,
}

impl ContentionReport {
    #[must_use]
    pub const fn lost_updates(&self) -> u64 {
        self.expected.saturating_sub(self.total)
    }
}

/// Runs `threads` workers that each add `per_thread` ones into a shared counter.
///
/// # Errors
///
/// Returns an error if a worker cannot be spawned or panics.
#[tracing::instrument]
pub fn shared_sum(
    granularity: LockGranularity,
    threads: usize,
    per_thread: u64,
) -> HarnessResult<ContentionReport> {
    let started = Instant::now();
    let guarded = Arc::new(GuardedValue::new(0_u64));
    let unguarded = Arc::new(AtomicU64::new(0));

    let mut workers = Vec::with_capacity(threads);
    for id in 0..threads {
        let guarded = Arc::clone(&guarded);
        let unguarded = Arc::clone(&unguarded);
        workers.push(Worker::spawn(id, move || match granularity {
            LockGranularity::Unguarded => {
                for _ in 0..per_thread {
                    let seen = unguarded.load(Ordering::Relaxed);
                    unguarded.store(seen.wrapping_add(1), Ordering::Relaxed);
                }
            }
            LockGranularity::PerIncrement => {
                for _ in 0..per_thread {
                    *guarded.scoped_access() += 1;
                }
            }
            LockGranularity::Batched => {
                let mut local_sum = 0_u64;
                for _ in 0..per_thread {
                    local_sum += 1;
                }
                *guarded.scoped_access() += local_sum;
            }
        })?);
    }

    for worker in &mut workers {
        worker.join()?;
    }

    let total = match granularity {
        LockGranularity::Unguarded => unguarded.load(Ordering::Relaxed),
        LockGranularity::PerIncrement | LockGranularity::Batched => *guarded.scoped_access(),
    };
    let report = ContentionReport {
        granularity,
        total,
        expected: per_thread.saturating_mul(threads as u64),
        elapsed: started.elapsed(),
    };
    tracing::info!(
        "{}: {} of {} increments kept",
        granularity,
        report.total,
        report.expected
    );
    Ok(report)
}
