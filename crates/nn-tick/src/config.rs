//! System configuration.

use nn_solver::{DEFAULT_BATCH_SIZE, NeighborSolver, SolverError};
use thiserror::Error;

/// Configuration error, raised at construction time only.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("update interval must be a positive, finite number of seconds (got {0})")]
    InvalidInterval(f32),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Result type for system construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for a [`crate::NeighborSystem`].
#[derive(Clone, Debug, PartialEq)]
pub struct SystemConfig {
    /// Seconds between recomputes.
    pub update_interval: f32,
    /// Slots preallocated in the registry.
    pub initial_capacity: usize,
    /// Indices per solver task.
    pub batch_size: usize,
    /// Dedicated solver workers; `None` shares rayon's global pool.
    pub worker_threads: Option<usize>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            update_interval: 0.1,
            initial_capacity: 100,
            batch_size: DEFAULT_BATCH_SIZE,
            worker_threads: None,
        }
    }
}

impl SystemConfig {
    /// Interval and capacity with default solver settings.
    #[must_use]
    pub fn new(update_interval: f32, initial_capacity: usize) -> Self {
        Self {
            update_interval,
            initial_capacity,
            ..Self::default()
        }
    }

    /// Indices per solver task.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Dedicated solver workers, or `None` for the global pool.
    #[must_use]
    pub const fn with_worker_threads(mut self, threads: Option<usize>) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Check everything that can be checked without starting threads.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.update_interval.is_finite() && self.update_interval > 0.0) {
            return Err(ConfigError::InvalidInterval(self.update_interval));
        }
        if self.batch_size == 0 {
            return Err(SolverError::ZeroBatchSize.into());
        }
        if self.worker_threads == Some(0) {
            return Err(SolverError::ZeroWorkers.into());
        }
        Ok(())
    }

    pub(crate) fn build_solver(&self) -> ConfigResult<NeighborSolver> {
        Ok(NeighborSolver::builder()
            .batch_size(self.batch_size)
            .worker_threads(self.worker_threads)
            .build()?)
    }
}
