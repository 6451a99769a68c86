//! Solver construction errors.

use thiserror::Error;

/// Invalid solver settings.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Batches must hold at least one index.
    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    /// A dedicated pool needs at least one worker.
    #[error("worker thread count must be at least 1")]
    ZeroWorkers,

    /// Rayon could not start the worker pool.
    #[error("failed to build solver thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for solver construction.
pub type SolverResult<T> = Result<T, SolverError>;
