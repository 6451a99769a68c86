//! Dense point storage with swap-remove.
//!
//! Positions live in a contiguous array indexed by slot. Slots `[0, count)`
//! are live, anything past `count` is stale head-room.
//!
//! # Handle instability
//!
//! Removal swaps the last live slot into the hole, so removing slot `i`
//! silently renames the point at `count - 1` to `i`. A handle returned by
//! [`PointRegistry::insert`] is only valid until the next removal of a
//! *different* slot. Callers that remove in LIFO order never observe this;
//! everyone else should use [`crate::StableRegistry`].
//!
//! # Growth
//!
//! Storage grows by exactly one slot when full and is trimmed to `count` after
//! every removal, so `capacity == count` after any growing insert or removal.

use std::alloc::Layout;

use tracing::{debug, trace};

use crate::{RegistryError, RegistryResult, Vec3};

/// Slot index of a point. Negative values never refer to a point.
pub type Handle = i32;

/// Neighbor value for "no neighbor yet" or a singleton.
pub const NO_NEIGHBOR: i32 = -1;

/// What a successful [`PointRegistry::remove`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Removed {
    /// Position that was stored at the removed handle.
    pub position: Vec3,
    /// Former handle of the point that now occupies the removed slot,
    /// or `None` if the removed slot was the last live one.
    pub relocated: Option<Handle>,
}

/// Registry of moving points addressed by dense slot handles.
pub struct PointRegistry {
    /// Positions, `len() == capacity`.
    positions: Vec<Vec3>,
    /// Last published neighbor per slot, `len() == capacity`.
    neighbors: Vec<i32>,
    /// Number of live slots.
    count: usize,
}

impl Default for PointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PointRegistry {
    /// Create an empty registry with no preallocated slots.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
            neighbors: Vec::new(),
            count: 0,
        }
    }

    /// Create an empty registry with `capacity` preallocated slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; capacity],
            neighbors: vec![NO_NEIGHBOR; capacity],
            count: 0,
        }
    }

    /// Number of live points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of allocated slots, live or stale.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Whether `handle` currently refers to a live slot.
    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.live_index(handle).is_some()
    }

    /// Insert a point and return its handle.
    ///
    /// Aborts through the global allocation error handler if storage cannot
    /// grow.
    ///
    /// # Panics
    ///
    /// Panics if the number of live points would exceed `i32::MAX`.
    pub fn insert(&mut self, position: Vec3) -> Handle {
        match self.try_insert(position) {
            Ok(handle) => handle,
            Err(RegistryError::Allocation { requested, .. }) => {
                let layout =
                    Layout::array::<Vec3>(requested).unwrap_or_else(|_| Layout::new::<Vec3>());
                std::alloc::handle_alloc_error(layout)
            }
            Err(err @ RegistryError::HandleOverflow(_)) => panic!("{err}"),
        }
    }

    /// Insert a point, reporting allocation failure instead of aborting.
    pub fn try_insert(&mut self, position: Vec3) -> RegistryResult<Handle> {
        let handle =
            Handle::try_from(self.count).map_err(|_| RegistryError::HandleOverflow(self.count))?;

        if self.count == self.capacity() {
            self.grow_exact(self.count + 1)?;
        }

        self.positions[self.count] = position;
        self.neighbors[self.count] = NO_NEIGHBOR;
        self.count += 1;

        Ok(handle)
    }

    /// Overwrite the position at `handle`.
    ///
    /// Returns `false` and does nothing if `handle` is not live.
    pub fn update(&mut self, handle: Handle, position: Vec3) -> bool {
        match self.live_index(handle) {
            Some(index) => {
                self.positions[index] = position;
                true
            }
            None => false,
        }
    }

    /// Swap-remove the point at `handle`, then trim storage to the new count.
    ///
    /// Returns `None` and does nothing if `handle` is not live.
    pub fn remove(&mut self, handle: Handle) -> Option<Removed> {
        let index = self.live_index(handle)?;
        let last = self.count - 1;
        let position = self.positions[index];

        let relocated = if index < last {
            self.positions[index] = self.positions[last];
            self.neighbors[index] = self.neighbors[last];
            // last < count <= i32::MAX
            Some(last as Handle)
        } else {
            None
        };

        self.count = last;
        self.shrink_to_count();

        Some(Removed {
            position,
            relocated,
        })
    }

    /// Position at `handle`, if live.
    #[must_use]
    pub fn position(&self, handle: Handle) -> Option<Vec3> {
        self.live_index(handle).map(|index| self.positions[index])
    }

    /// Last published neighbor of `handle`, or [`NO_NEIGHBOR`] if `handle` is
    /// not live or no solve has covered it yet.
    ///
    /// The result may be stale: it refers to the slot layout at the time it was
    /// published.
    #[must_use]
    pub fn get_neighbor(&self, handle: Handle) -> i32 {
        self.live_index(handle)
            .map_or(NO_NEIGHBOR, |index| self.neighbors[index])
    }

    /// Live positions, `[0, count)`.
    #[must_use]
    pub fn snapshot(&self) -> &[Vec3] {
        &self.positions[..self.count]
    }

    /// Published neighbors for the live slots, `[0, count)`.
    #[must_use]
    pub fn neighbors(&self) -> &[i32] {
        &self.neighbors[..self.count]
    }

    /// Iterate live `(handle, position)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, Vec3)> + '_ {
        self.snapshot()
            .iter()
            .enumerate()
            .map(|(index, &position)| (index as Handle, position))
    }

    /// Replace the neighbor array with a freshly solved one.
    ///
    /// `fresh` must be aligned with the current slot layout. Returns `false`
    /// and keeps the old array if its length differs from [`Self::len`].
    pub fn publish_neighbors(&mut self, mut fresh: Vec<i32>) -> bool {
        if fresh.len() != self.count {
            return false;
        }

        fresh.resize(self.capacity(), NO_NEIGHBOR);
        self.neighbors = fresh;
        true
    }

    fn live_index(&self, handle: Handle) -> Option<usize> {
        usize::try_from(handle).ok().filter(|&index| index < self.count)
    }

    fn grow_exact(&mut self, new_capacity: usize) -> RegistryResult<()> {
        let additional = new_capacity - self.capacity();
        let alloc_err = |source| RegistryError::Allocation {
            requested: new_capacity,
            source,
        };

        self.positions
            .try_reserve_exact(additional)
            .map_err(alloc_err)?;
        self.neighbors
            .try_reserve_exact(additional)
            .map_err(alloc_err)?;

        self.positions.resize(new_capacity, Vec3::ZERO);
        self.neighbors.resize(new_capacity, NO_NEIGHBOR);

        debug!(capacity = new_capacity, "grew point storage");
        Ok(())
    }

    fn shrink_to_count(&mut self) {
        self.positions.truncate(self.count);
        self.positions.shrink_to_fit();
        self.neighbors.truncate(self.count);
        self.neighbors.shrink_to_fit();

        trace!(capacity = self.count, "trimmed point storage");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32) -> Vec3 {
        Vec3::new(x, 0.0, 0.0)
    }

    #[test]
    fn test_insert_returns_dense_handles() {
        let mut registry = PointRegistry::with_capacity(4);

        assert_eq!(registry.insert(p(1.0)), 0);
        assert_eq!(registry.insert(p(2.0)), 1);
        assert_eq!(registry.insert(p(3.0)), 2);

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.capacity(), 4);
        assert_eq!(registry.snapshot(), &[p(1.0), p(2.0), p(3.0)]);
    }

    #[test]
    fn test_grow_by_exactly_one() {
        let mut registry = PointRegistry::with_capacity(2);

        registry.insert(p(0.0));
        registry.insert(p(1.0));
        assert_eq!(registry.capacity(), 2);

        registry.insert(p(2.0));
        assert_eq!(registry.capacity(), 3);
        assert_eq!(registry.len(), 3);

        registry.insert(p(3.0));
        assert_eq!(registry.capacity(), 4);
    }

    #[test]
    fn test_grow_from_zero_capacity() {
        let mut registry = PointRegistry::new();
        assert_eq!(registry.capacity(), 0);

        assert_eq!(registry.insert(p(5.0)), 0);
        assert_eq!(registry.capacity(), 1);
        assert_eq!(registry.position(0), Some(p(5.0)));
    }

    #[test]
    fn test_update_ignores_invalid_handles() {
        let mut registry = PointRegistry::with_capacity(4);
        let h = registry.insert(p(1.0));

        assert!(registry.update(h, p(9.0)));
        assert!(!registry.update(-1, p(7.0)));
        assert!(!registry.update(1, p(7.0)));
        assert!(!registry.update(i32::MAX, p(7.0)));

        assert_eq!(registry.snapshot(), &[p(9.0)]);
    }

    #[test]
    fn test_update_ignores_stale_headroom_slot() {
        // Slot 2 exists in capacity but is not live.
        let mut registry = PointRegistry::with_capacity(4);
        registry.insert(p(1.0));
        registry.insert(p(2.0));

        assert!(!registry.update(2, p(3.0)));
        assert_eq!(registry.position(2), None);
    }

    #[test]
    fn test_swap_remove_relocates_last() {
        let mut registry = PointRegistry::with_capacity(4);
        registry.insert(p(0.0));
        registry.insert(p(1.0));
        registry.insert(p(2.0));
        registry.insert(p(3.0));
        assert!(registry.publish_neighbors(vec![1, 0, 3, 2]));

        let removed = registry.remove(1).unwrap();

        assert_eq!(removed.position, p(1.0));
        assert_eq!(removed.relocated, Some(3));
        assert_eq!(registry.snapshot(), &[p(0.0), p(3.0), p(2.0)]);

        // The last slot's neighbor moves with it and stays stale until the
        // next solve.
        assert_eq!(registry.get_neighbor(1), 2);
        assert_eq!(registry.neighbors(), &[1, 2, 3]);
        assert_eq!(registry.get_neighbor(3), NO_NEIGHBOR);
    }

    #[test]
    fn test_remove_last_only_decrements() {
        let mut registry = PointRegistry::with_capacity(4);
        registry.insert(p(0.0));
        registry.insert(p(1.0));
        registry.insert(p(2.0));

        let removed = registry.remove(2).unwrap();

        assert_eq!(removed.relocated, None);
        assert_eq!(registry.snapshot(), &[p(0.0), p(1.0)]);
    }

    #[test]
    fn test_remove_trims_capacity() {
        let mut registry = PointRegistry::with_capacity(10);
        registry.insert(p(0.0));
        registry.insert(p(1.0));
        registry.insert(p(2.0));
        assert_eq!(registry.capacity(), 10);

        registry.remove(0);
        assert_eq!(registry.capacity(), 2);
        assert_eq!(registry.len(), 2);

        registry.remove(0);
        registry.remove(0);
        assert_eq!(registry.capacity(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_ignores_invalid_handles() {
        let mut registry = PointRegistry::with_capacity(4);
        registry.insert(p(0.0));

        assert!(registry.remove(-1).is_none());
        assert!(registry.remove(1).is_none());
        assert_eq!(registry.len(), 1);
        // An ignored removal does not trim head-room either.
        assert_eq!(registry.capacity(), 4);
    }

    #[test]
    fn test_removed_handle_is_reused_by_relocated_point() {
        let mut registry = PointRegistry::new();
        let a = registry.insert(p(0.0));
        let _b = registry.insert(p(1.0));
        let c = registry.insert(p(2.0));

        registry.remove(a);

        // `c` now lives at `a`'s old slot; its original handle is dead.
        assert_eq!(registry.position(a), Some(p(2.0)));
        assert!(!registry.contains(c));
    }

    #[test]
    fn test_get_neighbor_defaults_and_bounds() {
        let mut registry = PointRegistry::with_capacity(2);
        let h = registry.insert(p(0.0));

        assert_eq!(registry.get_neighbor(h), NO_NEIGHBOR);
        assert_eq!(registry.get_neighbor(-5), NO_NEIGHBOR);
        assert_eq!(registry.get_neighbor(7), NO_NEIGHBOR);
    }

    #[test]
    fn test_publish_neighbors() {
        let mut registry = PointRegistry::with_capacity(8);
        registry.insert(p(0.0));
        registry.insert(p(1.0));
        registry.insert(p(5.0));

        assert!(registry.publish_neighbors(vec![1, 0, 1]));
        assert_eq!(registry.neighbors(), &[1, 0, 1]);
        assert_eq!(registry.get_neighbor(2), 1);
        assert_eq!(registry.capacity(), 8);

        // Misaligned arrays are rejected.
        assert!(!registry.publish_neighbors(vec![0, 1]));
        assert_eq!(registry.neighbors(), &[1, 0, 1]);
    }

    #[test]
    fn test_insert_resets_neighbor_of_new_slot() {
        let mut registry = PointRegistry::with_capacity(4);
        registry.insert(p(0.0));
        registry.insert(p(1.0));
        registry.publish_neighbors(vec![1, 0]);

        registry.remove(1);
        let h = registry.insert(p(3.0));

        assert_eq!(registry.get_neighbor(h), NO_NEIGHBOR);
    }

    #[test]
    fn test_iter_yields_live_slots() {
        let mut registry = PointRegistry::with_capacity(4);
        registry.insert(p(1.0));
        registry.insert(p(2.0));

        let items: Vec<_> = registry.iter().collect();
        assert_eq!(items, vec![(0, p(1.0)), (1, p(2.0))]);
    }
}
