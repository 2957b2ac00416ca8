//! Result sink for statically partitioned runs.

use lockstep_sync::GuardedValue;

/// Shared, mutex-guarded vector that batch workers push their hits into.
#[derive(Debug, Default)]
pub struct ResultCollector {
    values: GuardedValue<Vec<u64>>,
}

impl ResultCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, value: u64) {
        self.values.scoped_access().push(value);
    }

    /// Returns everything collected so far, sorted ascending.
    #[must_use]
    pub fn collect(&self) -> Vec<u64> {
        let mut values = self.values.scoped_access();
        values.sort_unstable();
        values.to_vec()
    }
}
