//! Work producers: hand out numbers from a bounded range and accumulate results.
//!
//! Three producers implement the same [`WorkProducer`] contract with increasingly
//! structured synchronization:
//!
//! - [`SplitLockProducer`]: two bare mutexes, one for the cursor, one for results.
//! - [`GuardedProducer`]: one [`GuardedValue`](lockstep_sync::GuardedValue) per state group.
//! - [`SignalingProducer`]: one [`SignalGuardedValue`](lockstep_sync::SignalGuardedValue) per
//!   state group plus a completion barrier, so completion can be awaited without holding
//!   the worker thread handles.
//!
//! Every producer keeps the cursor and the results behind separate locks and never
//! holds both at once.

pub mod guarded;
pub mod signaling;
pub mod split_lock;

pub use guarded::GuardedProducer;
pub use signaling::SignalingProducer;
pub use split_lock::SplitLockProducer;

/// Lifecycle of a producer's range. `Active` → `Exhausted` is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerPhase {
    Active,
    Exhausted,
}

/// Issues non-overlapping work items to any number of callers and collects results.
pub trait WorkProducer: Send + Sync {
    /// Claims the next unclaimed number, or `None` once the range is consumed.
    ///
    /// No two callers ever receive the same number and no number is skipped.
    fn produce(&self) -> Option<u64>;

    /// Records a hit. Safe from any number of threads; insertion order is unspecified.
    fn add_result(&self, value: u64);

    /// Returns the accumulated results sorted ascending.
    ///
    /// Call only once every worker has stopped reporting (joined, or past the
    /// completion barrier); otherwise the snapshot may be missing late results.
    fn collect_results(&self) -> Vec<u64>;

    fn phase(&self) -> ProducerPhase;

    /// Called once by each worker after [`produce`](Self::produce) returned `None`.
    fn worker_finished(&self) {}
}

/// Cursor over `[start, start + count)`, the shared state behind `produce`.
///
/// Tracks how many numbers are left rather than an end bound, so a range that
/// finishes at `u64::MAX` hands out every number including the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRange {
    cursor: u64,
    remaining: u64,
}

impl WorkRange {
    /// Builds the range of `count` numbers starting at `start`.
    ///
    /// Numbers past `u64::MAX` do not exist, so a `count` reaching beyond it stops
    /// at `u64::MAX`. [`HarnessConfig::validate`](crate::config::HarnessConfig::validate)
    /// rejects such shapes before a run starts.
    #[must_use]
    pub const fn new(start: u64, count: u64) -> Self {
        let representable = (u64::MAX - start).saturating_add(1);
        let remaining = if count < representable {
            count
        } else {
            representable
        };
        Self {
            cursor: start,
            remaining,
        }
    }

    /// Claims the number under the cursor and advances it.
    pub fn claim(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }

        let claimed = self.cursor;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.cursor += 1;
        }
        Some(claimed)
    }

    #[must_use]
    pub const fn phase(&self) -> ProducerPhase {
        if self.remaining > 0 {
            ProducerPhase::Active
        } else {
            ProducerPhase::Exhausted
        }
    }

    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Iterator for WorkRange {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.claim()
    }
}

/// Sorts `values` in place and returns a copy of the ordered results.
pub(crate) fn sorted_snapshot(values: &mut [u64]) -> Vec<u64> {
    values.sort_unstable();
    values.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// WHY: The range drives the partition property
    /// WHAT: Claims walk the range in order then stay exhausted
    #[test]
    fn test_work_range_claims_in_order() {
        let mut range = WorkRange::new(10, 3);
        assert_eq!(range.phase(), ProducerPhase::Active);
        assert_eq!(range.claim(), Some(10));
        assert_eq!(range.claim(), Some(11));
        assert_eq!(range.remaining(), 1);
        assert_eq!(range.claim(), Some(12));
        assert_eq!(range.phase(), ProducerPhase::Exhausted);
        assert_eq!(range.claim(), None);
        assert_eq!(range.claim(), None);
    }

    #[test]
    fn test_empty_range_starts_exhausted() {
        let mut range = WorkRange::new(1_000_000_000, 0);
        assert_eq!(range.phase(), ProducerPhase::Exhausted);
        assert_eq!(range.claim(), None);
    }

    /// WHY: A range touching the top of u64 must not drop its last number
    /// WHAT: Every number up to and including u64::MAX is claimed exactly once
    #[test]
    fn test_range_ending_at_u64_max_claims_every_number() {
        let mut range = WorkRange::new(u64::MAX - 1, 2);
        assert_eq!(range.claim(), Some(u64::MAX - 1));
        assert_eq!(range.claim(), Some(u64::MAX));
        assert_eq!(range.phase(), ProducerPhase::Exhausted);
        assert_eq!(range.claim(), None);

        let mut last = WorkRange::new(u64::MAX, 1);
        assert_eq!(last.claim(), Some(u64::MAX));
        assert_eq!(last.claim(), None);
    }

    /// WHY: The cursor must never wrap around to small numbers
    /// WHAT: A count reaching past u64::MAX stops at u64::MAX
    #[test]
    fn test_range_never_wraps() {
        let claimed: Vec<u64> = WorkRange::new(u64::MAX - 2, 10).collect();
        assert_eq!(claimed, vec![u64::MAX - 2, u64::MAX - 1, u64::MAX]);
    }
}
