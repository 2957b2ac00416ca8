//! Thread-owning workers.
//!
//! A [`Worker`] owns exactly one OS thread for the length of one run. Joining is
//! idempotent and happens automatically on drop, so a worker can never leak its
//! thread past the scope that created it.

use std::any::Any;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::collector::ResultCollector;
use crate::errors::{HarnessError, HarnessResult};
use crate::primality::SharedPrimalityTest;
use crate::producers::{WorkProducer, WorkRange};

pub struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns a named thread running `body`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::FailedSpawn`] if the OS cannot start the thread.
    pub fn spawn<F>(id: usize, body: F) -> HarnessResult<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let thread_name = format!("lockstep_worker_{id}");
        let handle = thread::Builder::new()
            .name(thread_name)
            .spawn(body)
            .map_err(|source| HarnessError::FailedSpawn { worker: id, source })?;

        tracing::debug!("Worker {} started", id);
        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Spawns a worker that pulls from `producer` until it is exhausted, reporting
    /// every prime back to it.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::FailedSpawn`] if the OS cannot start the thread.
    pub fn pulling<P>(id: usize, producer: Arc<P>, test: SharedPrimalityTest) -> HarnessResult<Self>
    where
        P: WorkProducer + ?Sized + 'static,
    {
        Self::spawn(id, move || {
            let span = tracing::trace_span!("Worker::pulling", worker = id);
            let _enter = span.enter();

            // Announces completion even if the body unwinds.
            let _finished = FinishOnExit(producer.as_ref());
            let checked = drain_producer(producer.as_ref(), test.as_ref());

            tracing::info!("Worker {} end after checking {} numbers", id, checked);
        })
    }

    /// Spawns a worker that scans the fixed batch `[start, start + batch_size)` and
    /// pushes every prime into `collector`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::FailedSpawn`] if the OS cannot start the thread.
    pub fn batch(
        id: usize,
        collector: Arc<ResultCollector>,
        start: u64,
        batch_size: u64,
        test: SharedPrimalityTest,
    ) -> HarnessResult<Self> {
        tracing::info!(
            "Worker {} assigned {} numbers from {}",
            id,
            batch_size,
            start
        );

        Self::spawn(id, move || {
            let span = tracing::trace_span!("Worker::batch", worker = id);
            let _enter = span.enter();

            for candidate in WorkRange::new(start, batch_size) {
                if test.is_prime(candidate) {
                    tracing::debug!("{} is prime", candidate);
                    collector.add(candidate);
                }
            }

            tracing::info!("Worker {} end", id);
        })
    }

    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub const fn is_joined(&self) -> bool {
        self.handle.is_none()
    }

    /// Blocks until the worker's thread has terminated.
    ///
    /// Safe to call any number of times; only the first call waits.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::WorkerPanicked`] if the thread panicked. The thread is
    /// considered joined either way.
    pub fn join(&mut self) -> HarnessResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        handle
            .join()
            .map_err(|payload| HarnessError::WorkerPanicked {
                worker: self.id,
                message: panic_message(payload.as_ref()),
            })
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Err(err) = self.join() {
            tracing::error!("Worker dropped with failure: {}", err);
        }
    }
}

impl core::fmt::Debug for Worker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("joined", &self.is_joined())
            .finish()
    }
}

struct FinishOnExit<'a, P: WorkProducer + ?Sized>(&'a P);

impl<P: WorkProducer + ?Sized> Drop for FinishOnExit<'_, P> {
    fn drop(&mut self) {
        self.0.worker_finished();
    }
}

/// Pulls from `producer` until it is exhausted, reporting each prime.
///
/// Returns how many numbers this caller checked.
pub fn drain_producer<P>(producer: &P, test: &dyn crate::primality::PrimalityTest) -> u64
where
    P: WorkProducer + ?Sized,
{
    let mut checked = 0_u64;
    while let Some(candidate) = producer.produce() {
        checked += 1;
        if test.is_prime(candidate) {
            tracing::debug!("{} is prime", candidate);
            producer.add_result(candidate);
        }
    }
    checked
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("<non-string panic payload>")
    }
}
