//! The seam between point storage and the neighbor solver.

use crate::{PointRegistry, Vec3};

/// Storage the solver can read from and publish into.
///
/// Implemented by [`PointRegistry`] and [`crate::StableRegistry`], so a
/// scheduler can drive either one.
pub trait PointStore {
    /// Live positions in slot order.
    fn snapshot(&self) -> &[Vec3];

    /// Replace the neighbor array with one aligned to [`Self::snapshot`].
    ///
    /// Returns `false` if the lengths disagree.
    fn publish_neighbors(&mut self, neighbors: Vec<i32>) -> bool;

    /// Number of live points.
    fn len(&self) -> usize {
        self.snapshot().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PointStore for PointRegistry {
    fn snapshot(&self) -> &[Vec3] {
        PointRegistry::snapshot(self)
    }

    fn publish_neighbors(&mut self, neighbors: Vec<i32>) -> bool {
        PointRegistry::publish_neighbors(self, neighbors)
    }

    fn len(&self) -> usize {
        PointRegistry::len(self)
    }
}
