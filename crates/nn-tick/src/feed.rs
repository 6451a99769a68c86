//! Read side of the published neighbor result.

use std::sync::Arc;

use nn_registry::{NO_NEIGHBOR, Vec3};
use parking_lot::RwLock;

/// One complete solve: the positions it read and the neighbors it produced.
///
/// Frames are immutable once published.
#[derive(Debug, Default)]
pub struct NeighborFrame {
    generation: u64,
    positions: Vec<Vec3>,
    neighbors: Vec<i32>,
}

impl NeighborFrame {
    pub(crate) fn new(generation: u64, positions: Vec<Vec3>, neighbors: Vec<i32>) -> Self {
        debug_assert_eq!(positions.len(), neighbors.len());
        Self {
            generation,
            positions,
            neighbors,
        }
    }

    /// Solve counter; `0` means nothing has been published yet.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Positions the frame was solved from.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Neighbor per slot, aligned with [`Self::positions`].
    #[must_use]
    pub fn neighbors(&self) -> &[i32] {
        &self.neighbors
    }

    /// Number of points in the frame.
    #[must_use]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Neighbor of `index` in this frame, or [`NO_NEIGHBOR`].
    #[must_use]
    pub fn neighbor(&self, index: usize) -> i32 {
        self.neighbors.get(index).copied().unwrap_or(NO_NEIGHBOR)
    }

    /// `(point, neighbor)` position pairs for every point that has one.
    pub fn pairs(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.neighbors
            .iter()
            .enumerate()
            .filter_map(|(index, &neighbor)| {
                let neighbor = usize::try_from(neighbor).ok()?;
                let to = self.positions.get(neighbor)?;
                Some((self.positions[index], *to))
            })
    }
}

/// Cloneable handle to the latest [`NeighborFrame`].
///
/// Publishing swaps the whole frame, so a reader holds either the previous or
/// the next complete result.
#[derive(Clone, Default)]
pub struct NeighborFeed {
    current: Arc<RwLock<Arc<NeighborFrame>>>,
}

impl NeighborFeed {
    /// Feed holding the empty generation-0 frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently published frame.
    #[must_use]
    pub fn latest(&self) -> Arc<NeighborFrame> {
        Arc::clone(&*self.current.read())
    }

    pub(crate) fn publish(&self, frame: NeighborFrame) {
        *self.current.write() = Arc::new(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_feed() {
        let feed = NeighborFeed::new();
        let frame = feed.latest();

        assert_eq!(frame.generation(), 0);
        assert!(frame.is_empty());
        assert_eq!(frame.neighbor(0), NO_NEIGHBOR);
    }

    #[test]
    fn test_readers_keep_their_frame() {
        let feed = NeighborFeed::new();
        let reader = feed.clone();

        feed.publish(NeighborFrame::new(1, vec![Vec3::ZERO; 2], vec![1, 0]));
        let held = reader.latest();

        feed.publish(NeighborFrame::new(2, vec![Vec3::ZERO; 3], vec![1, 0, 0]));

        assert_eq!(held.generation(), 1);
        assert_eq!(held.neighbors(), &[1, 0]);
        assert_eq!(reader.latest().generation(), 2);
    }

    #[test]
    fn test_pairs_skip_missing_neighbors() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(9.0, 0.0, 0.0);
        let frame = NeighborFrame::new(3, vec![a, b, c], vec![1, NO_NEIGHBOR, 7]);

        let pairs: Vec<_> = frame.pairs().collect();
        assert_eq!(pairs, vec![(a, b)]);
    }
}
