use derive_more::derive::From;

use crate::config::ConfigError;

#[derive(Debug, From)]
pub enum HarnessError {
    /// The OS refused to start the thread for a worker.
    #[from(ignore)]
    FailedSpawn {
        worker: usize,
        source: std::io::Error,
    },

    /// A worker thread panicked; surfaced when it is joined.
    #[from(ignore)]
    WorkerPanicked { worker: usize, message: String },

    Config(ConfigError),
}

impl core::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::FailedSpawn { source, .. } => Some(source),
            Self::Config(err) => Some(err),
            Self::WorkerPanicked { .. } => None,
        }
    }
}

impl core::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FailedSpawn { worker, source } => {
                write!(f, "failed to spawn worker {worker}: {source}")
            }
            Self::WorkerPanicked { worker, message } => {
                write!(f, "worker {worker} panicked: {message}")
            }
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

pub type HarnessResult<T> = std::result::Result<T, HarnessError>;
