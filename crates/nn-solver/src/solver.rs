//! Batched all-pairs closest-neighbor search.

use nn_registry::{NO_NEIGHBOR, Vec3};
use rayon::prelude::*;
use tracing::trace;

use crate::{SolverError, SolverResult};

/// Indices handed to one rayon task.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Index of the point closest to `positions[index]`, excluding itself.
///
/// Ties go to the lowest index. Returns [`NO_NEIGHBOR`] when there is no other
/// point, or when every candidate distance is non-finite.
///
/// # Panics
///
/// Panics if `index` is out of bounds.
#[must_use]
pub fn nearest(positions: &[Vec3], index: usize) -> i32 {
    let origin = positions[index];
    let mut best_distance = f32::MAX;
    let mut best = NO_NEIGHBOR;

    for (candidate, &position) in positions.iter().enumerate() {
        if candidate == index {
            continue;
        }

        let distance = origin.distance_squared(position);
        if distance < best_distance {
            best_distance = distance;
            best = candidate as i32;
        }
    }

    best
}

/// Solve with [`DEFAULT_BATCH_SIZE`] on the current rayon pool.
#[must_use]
pub fn solve(positions: &[Vec3]) -> Vec<i32> {
    solve_batched(positions, DEFAULT_BATCH_SIZE)
}

/// Closest neighbor of every point, aligned with `positions`.
///
/// Always returns a fresh buffer. Fewer than two points short-circuit to all
/// [`NO_NEIGHBOR`] without touching the pool. The result does not depend on
/// `batch_size`; zero is treated as one.
#[must_use]
pub fn solve_batched(positions: &[Vec3], batch_size: usize) -> Vec<i32> {
    let mut neighbors = vec![NO_NEIGHBOR; positions.len()];
    if positions.len() <= 1 {
        return neighbors;
    }

    let batch_size = batch_size.max(1);
    trace!(
        points = positions.len(),
        batches = positions.len().div_ceil(batch_size),
        "solving nearest neighbors"
    );

    neighbors
        .par_chunks_mut(batch_size)
        .enumerate()
        .for_each(|(batch, out)| {
            let start = batch * batch_size;
            for (offset, slot) in out.iter_mut().enumerate() {
                *slot = nearest(positions, start + offset);
            }
        });

    neighbors
}

/// Builder for [`NeighborSolver`].
#[derive(Clone, Debug)]
pub struct SolverBuilder {
    batch_size: usize,
    worker_threads: Option<usize>,
}

impl Default for SolverBuilder {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            worker_threads: None,
        }
    }
}

impl SolverBuilder {
    /// Default batch size on rayon's global pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices per rayon task. Must be non-zero.
    #[must_use]
    pub const fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Run on a dedicated pool of `threads` workers instead of rayon's global
    /// pool.
    #[must_use]
    pub const fn worker_threads(mut self, threads: Option<usize>) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Validate the settings and start the dedicated pool, if any.
    ///
    /// # Errors
    ///
    /// [`SolverError::ZeroBatchSize`] or [`SolverError::ZeroWorkers`] for
    /// invalid settings, [`SolverError::ThreadPool`] if rayon cannot spawn the
    /// workers.
    pub fn build(self) -> SolverResult<NeighborSolver> {
        if self.batch_size == 0 {
            return Err(SolverError::ZeroBatchSize);
        }

        let pool = match self.worker_threads {
            Some(0) => return Err(SolverError::ZeroWorkers),
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("nn-solver-{i}"))
                    .build()?,
            ),
            None => None,
        };

        Ok(NeighborSolver {
            batch_size: self.batch_size,
            pool,
        })
    }
}

/// A configured solver: batch size plus the pool it fans out on.
pub struct NeighborSolver {
    batch_size: usize,
    pool: Option<rayon::ThreadPool>,
}

impl Default for NeighborSolver {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            pool: None,
        }
    }
}

impl NeighborSolver {
    /// Solver with [`DEFAULT_BATCH_SIZE`] on rayon's global pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start configuring a solver.
    #[must_use]
    pub fn builder() -> SolverBuilder {
        SolverBuilder::new()
    }

    /// Indices per rayon task.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of workers the solve fans out to.
    #[must_use]
    pub fn worker_threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, rayon::ThreadPool::current_num_threads)
    }

    /// Blocking solve; returns once every batch has joined.
    #[must_use]
    pub fn solve(&self, positions: &[Vec3]) -> Vec<i32> {
        match &self.pool {
            Some(pool) => pool.install(|| solve_batched(positions, self.batch_size)),
            None => solve_batched(positions, self.batch_size),
        }
    }
}
