//! Producer built on [`GuardedValue`].

use lockstep_sync::GuardedValue;

use super::{sorted_snapshot, ProducerPhase, WorkProducer, WorkRange};

/// Same contract as [`SplitLockProducer`](super::SplitLockProducer), but each state
/// group lives inside a [`GuardedValue`] so it cannot be touched without its lock.
#[derive(Debug)]
pub struct GuardedProducer {
    range: GuardedValue<WorkRange>,
    results: GuardedValue<Vec<u64>>,
}

impl GuardedProducer {
    #[must_use]
    pub fn new(start: u64, count: u64) -> Self {
        Self {
            range: GuardedValue::new(WorkRange::new(start, count)),
            results: GuardedValue::new(Vec::new()),
        }
    }
}

impl WorkProducer for GuardedProducer {
    fn produce(&self) -> Option<u64> {
        self.range.scoped_access().claim()
    }

    fn add_result(&self, value: u64) {
        self.results.scoped_access().push(value);
    }

    fn collect_results(&self) -> Vec<u64> {
        let mut results = self.results.scoped_access();
        sorted_snapshot(&mut results)
    }

    fn phase(&self) -> ProducerPhase {
        self.range.scoped_access().phase()
    }
}
