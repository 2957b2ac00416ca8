//! Producer guarded by two bare mutexes.

use std::sync::{Mutex, PoisonError};

use super::{sorted_snapshot, ProducerPhase, WorkProducer, WorkRange};

/// Keeps the cursor and the result vector behind two independent `std::sync::Mutex`es.
#[derive(Debug)]
pub struct SplitLockProducer {
    cursor: Mutex<WorkRange>,
    results: Mutex<Vec<u64>>,
}

impl SplitLockProducer {
    #[must_use]
    pub fn new(start: u64, count: u64) -> Self {
        Self {
            cursor: Mutex::new(WorkRange::new(start, count)),
            results: Mutex::new(Vec::new()),
        }
    }
}

impl WorkProducer for SplitLockProducer {
    fn produce(&self) -> Option<u64> {
        self.cursor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .claim()
    }

    fn add_result(&self, value: u64) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
    }

    fn collect_results(&self) -> Vec<u64> {
        let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        sorted_snapshot(&mut results)
    }

    fn phase(&self) -> ProducerPhase {
        self.cursor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .phase()
    }
}
