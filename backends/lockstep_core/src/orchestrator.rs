//! Runs the prime search under each coordination strategy.
//!
//! The orchestrator owns every shared object for a run: it builds the producer (or
//! collector), hands `Arc` clones to the workers, waits for completion and only then
//! reads the results.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::collector::ResultCollector;
use crate::config::HarnessConfig;
use crate::errors::HarnessResult;
use crate::primality::SharedPrimalityTest;
use crate::producers::{
    GuardedProducer, SignalingProducer, SplitLockProducer, WorkProducer, WorkRange,
};
use crate::worker::Worker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Single-threaded scan on the calling thread; the reference answer.
    Sequential,
    /// One fixed contiguous batch per worker, completion by join.
    StaticPartition,
    /// Workers pull from a [`SplitLockProducer`], completion by join.
    DynamicSplitLock,
    /// Workers pull from a [`GuardedProducer`], completion by join.
    DynamicGuarded,
    /// Workers pull from a [`SignalingProducer`], completion by its barrier.
    DynamicSignaling,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Sequential,
        Strategy::StaticPartition,
        Strategy::DynamicSplitLock,
        Strategy::DynamicGuarded,
        Strategy::DynamicSignaling,
    ];
}

impl core::fmt::Display for Strategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Sequential => "sequential",
            Self::StaticPartition => "static partition",
            Self::DynamicSplitLock => "dynamic pull (split mutexes)",
            Self::DynamicGuarded => "dynamic pull (guarded values)",
            Self::DynamicSignaling => "dynamic pull (condition-variable barrier)",
        };
        f.write_str(name)
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub strategy: Strategy,
    /// Primes found, ascending.
    pub primes: Vec<u64>,
    pub elapsed: Duration,
}

impl core::fmt::Display for RunReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for prime in &self.primes {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{prime}")?;
            first = false;
        }
        Ok(())
    }
}

pub struct Orchestrator {
    config: HarnessConfig,
    test: SharedPrimalityTest,
}

impl Orchestrator {
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`](crate::errors::HarnessError::Config) if the
    /// config does not validate.
    pub fn new(config: HarnessConfig, test: SharedPrimalityTest) -> HarnessResult<Self> {
        config.validate()?;
        Ok(Self { config, test })
    }

    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Runs the search once with `strategy`.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker cannot be spawned or panics.
    #[tracing::instrument(skip(self))]
    pub fn run(&self, strategy: Strategy) -> HarnessResult<RunReport> {
        let started = Instant::now();
        tracing::info!(
            "Running {} over {} numbers from {} with {} workers",
            strategy,
            self.config.range_len(),
            self.config.get_range_start(),
            self.config.get_worker_count()
        );

        let start = self.config.get_range_start();
        let count = self.config.range_len();
        let primes = match strategy {
            Strategy::Sequential => self.run_sequential(),
            Strategy::StaticPartition => self.run_static_partition()?,
            Strategy::DynamicSplitLock => {
                self.run_until_joined(Arc::new(SplitLockProducer::new(start, count)))?
            }
            Strategy::DynamicGuarded => {
                self.run_until_joined(Arc::new(GuardedProducer::new(start, count)))?
            }
            Strategy::DynamicSignaling => {
                self.run_until_signaled(Arc::new(SignalingProducer::new(start, count)))?
            }
        };

        let report = RunReport {
            strategy,
            primes,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            "{} found {} primes in {:?}",
            strategy,
            report.primes.len(),
            report.elapsed
        );
        Ok(report)
    }

    /// Runs every strategy in [`Strategy::ALL`] order.
    ///
    /// # Errors
    ///
    /// Stops at the first run that fails.
    pub fn run_all(&self) -> HarnessResult<Vec<RunReport>> {
        Strategy::ALL
            .iter()
            .map(|strategy| self.run(*strategy))
            .collect()
    }

    fn run_sequential(&self) -> Vec<u64> {
        WorkRange::new(self.config.get_range_start(), self.config.range_len())
            .filter(|candidate| self.test.is_prime(*candidate))
            .collect()
    }

    fn run_static_partition(&self) -> HarnessResult<Vec<u64>> {
        let collector = Arc::new(ResultCollector::new());
        let batch_size = self.config.get_batch_size();

        let mut workers = Vec::with_capacity(self.config.get_worker_count());
        let mut batch_start = self.config.get_range_start();
        for id in 0..self.config.get_worker_count() {
            workers.push(Worker::batch(
                id,
                Arc::clone(&collector),
                batch_start,
                batch_size,
                Arc::clone(&self.test),
            )?);
            // Only the start after the final batch can overflow.
            let Some(next) = batch_start.checked_add(batch_size) else {
                break;
            };
            batch_start = next;
        }

        join_all(&mut workers)?;
        Ok(collector.collect())
    }

    fn run_until_joined<P>(&self, producer: Arc<P>) -> HarnessResult<Vec<u64>>
    where
        P: WorkProducer + 'static,
    {
        let mut workers = self.spawn_pulling(&producer)?;
        join_all(&mut workers)?;
        Ok(producer.collect_results())
    }

    fn run_until_signaled(&self, producer: Arc<SignalingProducer>) -> HarnessResult<Vec<u64>> {
        let mut workers = self.spawn_pulling(&producer)?;

        // Completion is established by the barrier; joining afterwards only reaps threads.
        producer.wait_until_all_finished(workers.len());
        let results = producer.collect_results();

        join_all(&mut workers)?;
        Ok(results)
    }

    fn spawn_pulling<P>(&self, producer: &Arc<P>) -> HarnessResult<Vec<Worker>>
    where
        P: WorkProducer + 'static,
    {
        (0..self.config.get_worker_count())
            .map(|id| Worker::pulling(id, Arc::clone(producer), Arc::clone(&self.test)))
            .collect()
    }
}

fn join_all(workers: &mut [Worker]) -> HarnessResult<()> {
    for worker in workers.iter_mut() {
        worker.join()?;
    }
    Ok(())
}
