//! Producer/worker coordination over a prime search.
//!
//! The crate spreads a slow primality check over a fixed integer range using one of
//! several coordination strategies:
//!
//! - [`producers`]: three [`WorkProducer`](producers::WorkProducer) implementations that
//!   hand out numbers and collect hits, from bare mutexes up to a condition-variable
//!   completion barrier.
//! - [`worker`]: [`Worker`](worker::Worker), a thread owner that joins exactly once.
//! - [`orchestrator`]: wires producers and workers together per [`Strategy`](orchestrator::Strategy).
//! - [`contention`]: a lock-granularity demo on a single guarded counter.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use lockstep_core::config::HarnessConfig;
//! use lockstep_core::orchestrator::{Orchestrator, Strategy};
//! use lockstep_core::primality::SqrtTrialDivision;
//!
//! let config = HarnessConfig::new().starting_at(0).batch_size(5).workers(2);
//! let orchestrator = Orchestrator::new(config, Arc::new(SqrtTrialDivision)).unwrap();
//!
//! let report = orchestrator.run(Strategy::DynamicSignaling).unwrap();
//! assert_eq!(report.primes, vec![2, 3, 5, 7]);
//! ```

pub mod collector;
pub mod config;
pub mod contention;
pub mod errors;
pub mod orchestrator;
pub mod primality;
pub mod producers;
pub mod worker;

pub use errors::{HarnessError, HarnessResult};
