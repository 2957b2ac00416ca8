//! The workload every worker runs: a pure, deterministic primality check.

use std::sync::Arc;

/// A pure primality check supplied to workers.
pub trait PrimalityTest: Send + Sync {
    fn is_prime(&self, n: u64) -> bool;
}

pub type SharedPrimalityTest = Arc<dyn PrimalityTest>;

/// Trial division by every candidate in `2..n`.
///
/// Deliberately O(n): this is the slow workload the harness spreads over threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrialDivision;

impl PrimalityTest for TrialDivision {
    fn is_prime(&self, n: u64) -> bool {
        if n <= 1 {
            return false;
        }
        (2..n).all(|divisor| n % divisor != 0)
    }
}

/// Trial division stopping at `√n`. Same answers as [`TrialDivision`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SqrtTrialDivision;

impl PrimalityTest for SqrtTrialDivision {
    fn is_prime(&self, n: u64) -> bool {
        if n <= 1 {
            return false;
        }
        let mut divisor = 2_u64;
        while divisor.saturating_mul(divisor) <= n {
            if n % divisor == 0 {
                return false;
            }
            divisor += 1;
        }
        true
    }
}
