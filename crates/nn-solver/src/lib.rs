//! Brute-force nearest-neighbor solver.
//!
//! For every point in a snapshot, finds the index of the closest *other* point
//! by scanning all pairs. Each output slot depends only on the read-only
//! snapshot, so the index range is split into fixed-size batches and fanned
//! out over rayon.
//!
//! ```text
//!  neighbors: [ batch 0 (64) | batch 1 (64) | ... | tail ]
//!                   │              │                 │
//!                worker         worker            worker     (rayon)
//!                   └──────── read-only positions ───┘
//! ```

mod error;
mod solver;

pub use error::{SolverError, SolverResult};
pub use solver::{DEFAULT_BATCH_SIZE, NeighborSolver, SolverBuilder, nearest, solve, solve_batched};
