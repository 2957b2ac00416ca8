//! Producer built on [`SignalGuardedValue`] with a completion barrier.

use lockstep_sync::SignalGuardedValue;

use super::{sorted_snapshot, ProducerPhase, WorkProducer, WorkRange};

#[derive(Debug, Default)]
struct ResultSet {
    values: Vec<u64>,
    ended_workers: usize,
}

/// Producer whose result group doubles as a completion barrier.
///
/// Each worker calls [`WorkProducer::worker_finished`] once it sees the range is
/// exhausted. The orchestrator blocks in [`SignalingProducer::wait_until_all_finished`]
/// until the expected number of workers have done so, without needing the workers'
/// thread handles.
#[derive(Debug)]
pub struct SignalingProducer {
    range: SignalGuardedValue<WorkRange>,
    results: SignalGuardedValue<ResultSet>,
}

impl SignalingProducer {
    #[must_use]
    pub fn new(start: u64, count: u64) -> Self {
        Self {
            range: SignalGuardedValue::new(WorkRange::new(start, count)),
            results: SignalGuardedValue::new(ResultSet::default()),
        }
    }

    /// Blocks until at least `expected` workers have called `worker_finished`.
    ///
    /// The count is re-checked under the lock after every wakeup, so spurious or
    /// early notifications never release the caller.
    pub fn wait_until_all_finished(&self, expected: usize) {
        let results = self
            .results
            .scoped_access()
            .wait_until(|results| results.ended_workers >= expected);

        tracing::debug!(
            "All {} expected workers finished ({} reported)",
            expected,
            results.ended_workers
        );
    }

    #[must_use]
    pub fn ended_workers(&self) -> usize {
        self.results.scoped_access().ended_workers
    }
}

impl WorkProducer for SignalingProducer {
    fn produce(&self) -> Option<u64> {
        self.range.scoped_access().claim()
    }

    fn add_result(&self, value: u64) {
        self.results.scoped_access().values.push(value);
    }

    fn collect_results(&self) -> Vec<u64> {
        let mut results = self.results.scoped_access();
        sorted_snapshot(&mut results.values)
    }

    fn phase(&self) -> ProducerPhase {
        self.range.scoped_access().phase()
    }

    fn worker_finished(&self) {
        {
            let mut results = self.results.scoped_access();
            results.ended_workers += 1;
        }
        self.results.notify_all();
    }
}
