//! Registry error types.

use std::collections::TryReserveError;

use thiserror::Error;

/// Registry error type.
///
/// Out-of-range handles are not errors; only resource exhaustion is.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Backing storage could not grow.
    #[error("failed to grow point storage to {requested} slots: {source}")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    /// Slot count no longer fits the `i32` handle space.
    #[error("handle space exhausted at {0} points")]
    HandleOverflow(usize),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
