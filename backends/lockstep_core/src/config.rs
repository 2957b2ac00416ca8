//! Run constants for the harness.
//!
//! The defaults are the fixed constants the `lockstep` binary runs with: the range
//! starts at one billion, each of the 4 workers gets a batch of 10 numbers. The binary
//! never reads a file; loading from TOML is a library surface for embedders and tests
//! (`tests/fixtures/lockstep.toml` is a sample).

use derive_more::derive::From;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RANGE_START: u64 = 1_000_000_000;
pub const DEFAULT_BATCH_SIZE: u64 = 10;
pub const DEFAULT_WORKER_COUNT: usize = 4;

#[derive(Debug, From)]
pub enum ConfigError {
    IOError(std::io::Error),

    DeserializationFailed(toml::de::Error),

    /// At least one worker is needed to make progress.
    #[from(ignore)]
    InvalidWorkerCount(usize),

    /// `batch_size * worker_count` numbers starting at `range_start` do not fit in `u64`.
    #[from(ignore)]
    RangeOverflow {
        range_start: u64,
        batch_size: u64,
        worker_count: usize,
    },
}

impl std::error::Error for ConfigError {}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Shape of a single run: where the range starts, how wide each worker's batch is
/// and how many workers share it.
///
/// # Examples
///
/// ```
/// use lockstep_core::config::HarnessConfig;
///
/// let config = HarnessConfig::new().starting_at(100).batch_size(5).workers(2);
/// assert_eq!(config.range_len(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    range_start: u64,
    batch_size: u64,
    worker_count: usize,
}

impl HarnessConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            range_start: DEFAULT_RANGE_START,
            batch_size: DEFAULT_BATCH_SIZE,
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }

    /// Sets the first number of the range.
    #[must_use]
    pub const fn starting_at(mut self, start: u64) -> Self {
        self.range_start = start;
        self
    }

    /// Sets how many numbers each worker is assigned under static partitioning.
    #[must_use]
    pub const fn batch_size(mut self, size: u64) -> Self {
        self.batch_size = size;
        self
    }

    #[must_use]
    pub const fn workers(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    #[must_use]
    pub const fn get_range_start(&self) -> u64 {
        self.range_start
    }

    #[must_use]
    pub const fn get_batch_size(&self) -> u64 {
        self.batch_size
    }

    #[must_use]
    pub const fn get_worker_count(&self) -> usize {
        self.worker_count
    }

    /// Total numbers in the range: one batch per worker.
    ///
    /// Saturates at `u64::MAX`; [`validate`](Self::validate) rejects shapes where it would.
    #[must_use]
    pub const fn range_len(&self) -> u64 {
        self.batch_size.saturating_mul(self.worker_count as u64)
    }

    /// Last number of the range, or `None` when the range is empty or does not fit
    /// in `u64`.
    #[must_use]
    pub fn range_last(&self) -> Option<u64> {
        self.batch_size
            .checked_mul(self.worker_count as u64)
            .and_then(|len| len.checked_sub(1))
            .and_then(|offset| self.range_start.checked_add(offset))
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWorkerCount`] when no worker is configured and
    /// [`ConfigError::RangeOverflow`] when the range would run past `u64::MAX`.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount(self.worker_count));
        }

        if self.batch_size > 0 && self.range_last().is_none() {
            return Err(ConfigError::RangeOverflow {
                range_start: self.range_start,
                batch_size: self.batch_size,
                worker_count: self.worker_count,
            });
        }
        Ok(())
    }

    /// Parses and validates a config from TOML text; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this shape or fails validation.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_path<V>(target: V) -> ConfigResult<Self>
    where
        V: Into<std::path::PathBuf>,
    {
        let target_path = target.into();
        let config_content = std::fs::read_to_string(target_path)?;
        Self::from_toml_str(&config_content)
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new()
    }
}
