//! End-to-end scenarios across every producer and strategy.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use lockstep_core::config::{ConfigError, HarnessConfig};
use lockstep_core::orchestrator::{Orchestrator, Strategy};
use lockstep_core::primality::{PrimalityTest, SharedPrimalityTest, SqrtTrialDivision};
use lockstep_core::producers::{
    GuardedProducer, ProducerPhase, SignalingProducer, SplitLockProducer, WorkProducer,
};
use tracing_test::traced_test;

const BILLION_RANGE_PRIMES: [u64; 4] = [1_000_000_007, 1_000_000_009, 1_000_000_021, 1_000_000_033];

fn sqrt_test() -> SharedPrimalityTest {
    Arc::new(SqrtTrialDivision)
}

/// Drains `producer` from `callers` threads and returns every claimed item.
fn drain_concurrently<P>(producer: Arc<P>, callers: usize) -> Vec<u64>
where
    P: WorkProducer + 'static,
{
    let handles: Vec<_> = (0..callers)
        .map(|_| {
            let producer = Arc::clone(&producer);
            thread::spawn(move || {
                let mut claimed = Vec::new();
                while let Some(item) = producer.produce() {
                    claimed.push(item);
                }
                claimed
            })
        })
        .collect();

    handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect()
}

fn assert_partition(claimed: &[u64], start: u64, len: u64) {
    let unique: BTreeSet<u64> = claimed.iter().copied().collect();
    assert_eq!(unique.len(), claimed.len(), "an item was handed out twice");
    assert_eq!(unique, (start..start + len).collect::<BTreeSet<u64>>());
}

#[test]
#[ntest::timeout(20000)]
fn test_every_producer_partitions_the_range() {
    for (len, callers) in [(0_u64, 1_usize), (1, 4), (37, 1), (1000, 3), (4096, 8)] {
        let start = 500;

        let claimed = drain_concurrently(Arc::new(SplitLockProducer::new(start, len)), callers);
        assert_partition(&claimed, start, len);

        let claimed = drain_concurrently(Arc::new(GuardedProducer::new(start, len)), callers);
        assert_partition(&claimed, start, len);

        let claimed = drain_concurrently(Arc::new(SignalingProducer::new(start, len)), callers);
        assert_partition(&claimed, start, len);
    }
}

#[test]
#[ntest::timeout(20000)]
fn test_billion_range_matches_for_every_strategy() {
    let orchestrator = Orchestrator::new(HarnessConfig::default(), sqrt_test()).unwrap();

    for strategy in Strategy::ALL {
        let report = orchestrator.run(strategy).unwrap();
        assert_eq!(report.primes, BILLION_RANGE_PRIMES, "{strategy}");
    }
}

/// WHY: The last representable number must be handed out like any other
/// WHAT: Every producer claims u64::MAX exactly once, then reports exhaustion
#[test]
#[ntest::timeout(5000)]
fn test_every_producer_reaches_u64_max() {
    let producers: Vec<Arc<dyn WorkProducer>> = vec![
        Arc::new(SplitLockProducer::new(u64::MAX, 1)),
        Arc::new(GuardedProducer::new(u64::MAX, 1)),
        Arc::new(SignalingProducer::new(u64::MAX, 1)),
    ];

    for producer in producers {
        assert_eq!(producer.produce(), Some(u64::MAX));
        assert_eq!(producer.produce(), None);
        assert_eq!(producer.phase(), ProducerPhase::Exhausted);
    }

    let claimed = drain_concurrently(Arc::new(GuardedProducer::new(u64::MAX - 99, 100)), 4);
    let unique: BTreeSet<u64> = claimed.iter().copied().collect();
    assert_eq!(unique.len(), 100);
    assert_eq!(unique.last(), Some(&u64::MAX));
}

/// WHY: The checked-in sample config must describe the binary's run
/// WHAT: Loading it from disk and running it finds the four billion-range primes
#[test]
#[ntest::timeout(20000)]
fn test_sample_config_file_runs() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/lockstep.toml");
    let config = HarnessConfig::from_path(path).unwrap();
    assert_eq!(config, HarnessConfig::default());

    let orchestrator = Orchestrator::new(config, sqrt_test()).unwrap();
    let report = orchestrator.run(Strategy::DynamicSignaling).unwrap();
    assert_eq!(report.primes, BILLION_RANGE_PRIMES);
}

#[test]
fn test_overflowing_config_file_rejected() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/overflowing.toml");
    let result = HarnessConfig::from_path(path);
    assert!(matches!(result, Err(ConfigError::RangeOverflow { .. })));
}

#[test]
#[ntest::timeout(5000)]
fn test_empty_range_is_exhausted_for_every_caller() {
    let producers: Vec<Arc<dyn WorkProducer>> = vec![
        Arc::new(SplitLockProducer::new(1_000_000_000, 0)),
        Arc::new(GuardedProducer::new(1_000_000_000, 0)),
        Arc::new(SignalingProducer::new(1_000_000_000, 0)),
    ];

    for producer in producers {
        assert_eq!(producer.phase(), ProducerPhase::Exhausted);
        for _ in 0..4 {
            assert_eq!(producer.produce(), None);
        }
        assert!(producer.collect_results().is_empty());
    }

    let orchestrator =
        Orchestrator::new(HarnessConfig::default().batch_size(0), sqrt_test()).unwrap();
    for report in orchestrator.run_all().unwrap() {
        assert!(report.primes.is_empty(), "{}", report.strategy);
    }
}

#[test]
#[ntest::timeout(20000)]
fn test_single_worker_matches_static_partition() {
    let config = HarnessConfig::default().batch_size(40).workers(1);
    let orchestrator = Orchestrator::new(config, sqrt_test()).unwrap();

    let reference = orchestrator.run(Strategy::StaticPartition).unwrap().primes;
    assert_eq!(reference, BILLION_RANGE_PRIMES);

    for strategy in [
        Strategy::DynamicSplitLock,
        Strategy::DynamicGuarded,
        Strategy::DynamicSignaling,
    ] {
        assert_eq!(orchestrator.run(strategy).unwrap().primes, reference, "{strategy}");
    }
}

/// WHY: Results must not depend on how many threads share the range
/// WHAT: Worker counts 1..=6 all report the sequential answer
#[test]
#[ntest::timeout(30000)]
fn test_results_independent_of_worker_count() {
    let expected: Vec<u64> = (10_000..10_600)
        .filter(|n| SqrtTrialDivision.is_prime(*n))
        .collect();

    for workers in 1..=6 {
        let config = HarnessConfig::new()
            .starting_at(10_000)
            .batch_size(600 / workers as u64)
            .workers(workers);
        let orchestrator = Orchestrator::new(config, sqrt_test()).unwrap();
        let len = config.range_len();
        let expected_here: Vec<u64> = expected
            .iter()
            .copied()
            .filter(|n| *n < 10_000 + len)
            .collect();

        for strategy in Strategy::ALL {
            let report = orchestrator.run(strategy).unwrap();
            assert_eq!(report.primes, expected_here, "{strategy} with {workers} workers");
        }
    }
}

#[test]
#[traced_test]
fn test_runs_are_logged() {
    let config = HarnessConfig::new().starting_at(0).batch_size(10).workers(2);
    let orchestrator = Orchestrator::new(config, sqrt_test()).unwrap();
    orchestrator.run(Strategy::DynamicGuarded).unwrap();

    assert!(logs_contain("Running dynamic pull (guarded values)"));
    assert!(logs_contain("found 8 primes"));
}
