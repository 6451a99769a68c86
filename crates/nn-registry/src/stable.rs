//! Stable point keys on top of swap-remove storage.
//!
//! A [`PointKey`] pairs a reusable key id with a generation counter. Ids are
//! recycled through a free list; the generation is bumped on every release so
//! keys held past removal are detected instead of silently aliasing another
//! point.

use std::fmt;

use crate::{Handle, PointRegistry, PointStore, Vec3};

/// How many times a key id has been released.
///
/// A [`PointKey`] is only honored while its generation matches the id's
/// current one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Generation(u32);

impl Generation {
    /// Generation of an id that has never been released.
    pub const FIRST: Self = Self(0);

    /// Generation after one more release. Wraps after `u32::MAX` releases.
    #[must_use]
    const fn bumped(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Number of releases of the id.
    #[must_use]
    pub const fn releases(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Identity of a point that survives swap-remove relocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey {
    id: u32,
    generation: Generation,
}

impl PointKey {
    /// Build a key by hand. Only keys handed out by a [`StableRegistry`]
    /// resolve to a point.
    #[must_use]
    pub const fn new(id: u32, generation: Generation) -> Self {
        Self { id, generation }
    }

    /// Reusable key id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.id
    }

    /// Generation the key was issued at.
    #[must_use]
    pub const fn generation(self) -> Generation {
        self.generation
    }
}

impl fmt::Debug for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PointKey({}{:?})", self.id, self.generation)
    }
}

/// Allocator for key ids with generation tracking.
#[derive(Default)]
struct KeyAllocator {
    generations: Vec<Generation>,
    free_list: Vec<u32>,
}

impl KeyAllocator {
    fn allocate(&mut self) -> PointKey {
        if let Some(id) = self.free_list.pop() {
            PointKey::new(id, self.generations[id as usize])
        } else {
            let id = self.generations.len() as u32;
            self.generations.push(Generation::FIRST);
            PointKey::new(id, Generation::FIRST)
        }
    }

    fn deallocate(&mut self, key: PointKey) -> bool {
        if !self.is_alive(key) {
            return false;
        }

        let id = key.id as usize;
        self.generations[id] = self.generations[id].bumped();
        self.free_list.push(key.id);
        true
    }

    fn is_alive(&self, key: PointKey) -> bool {
        self.generations
            .get(key.id as usize)
            .is_some_and(|&generation| generation == key.generation)
    }
}

/// A [`PointRegistry`] addressed by [`PointKey`] instead of raw slots.
///
/// Slot layout, growth and neighbor semantics are exactly those of the
/// wrapped registry; this type only keeps the key ↔ slot tables in step with
/// swap-remove.
#[derive(Default)]
pub struct StableRegistry {
    registry: PointRegistry,
    keys: KeyAllocator,
    /// Slot per key id; `None` for released ids.
    slot_of_key: Vec<Option<Handle>>,
    /// Key per live slot.
    key_of_slot: Vec<PointKey>,
}

impl StableRegistry {
    /// Empty registry with no preallocated slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry with `capacity` slots preallocated.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            registry: PointRegistry::with_capacity(capacity),
            keys: KeyAllocator::default(),
            slot_of_key: Vec::with_capacity(capacity),
            key_of_slot: Vec::with_capacity(capacity),
        }
    }

    /// The underlying slot-addressed registry.
    #[must_use]
    pub const fn registry(&self) -> &PointRegistry {
        &self.registry
    }

    /// Number of live points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Add a point at the end of the slot array and issue its key.
    ///
    /// # Panics
    ///
    /// Same as [`PointRegistry::insert`].
    pub fn insert(&mut self, position: Vec3) -> PointKey {
        let handle = self.registry.insert(position);
        let key = self.keys.allocate();

        let id = key.id as usize;
        if id >= self.slot_of_key.len() {
            self.slot_of_key.resize(id + 1, None);
        }
        self.slot_of_key[id] = Some(handle);
        self.key_of_slot.push(key);

        key
    }

    /// Returns `false` if `key` is stale.
    pub fn update(&mut self, key: PointKey, position: Vec3) -> bool {
        self.slot(key)
            .is_some_and(|handle| self.registry.update(handle, position))
    }

    /// Remove the point behind `key`, returning its last position.
    ///
    /// Stale keys are ignored.
    pub fn remove(&mut self, key: PointKey) -> Option<Vec3> {
        let handle = self.slot(key)?;
        let removed = self.registry.remove(handle)?;

        self.keys.deallocate(key);
        self.slot_of_key[key.id as usize] = None;

        let index = handle as usize;
        self.key_of_slot.swap_remove(index);
        if removed.relocated.is_some() {
            let moved = self.key_of_slot[index];
            self.slot_of_key[moved.id as usize] = Some(handle);
        }

        Some(removed.position)
    }

    /// Whether `key` still refers to a live point.
    #[must_use]
    pub fn contains(&self, key: PointKey) -> bool {
        self.slot(key).is_some()
    }

    /// Current slot of `key`, valid until the next removal.
    #[must_use]
    pub fn slot(&self, key: PointKey) -> Option<Handle> {
        if !self.keys.is_alive(key) {
            return None;
        }
        self.slot_of_key.get(key.id as usize).copied().flatten()
    }

    /// Key currently stored at `handle`.
    #[must_use]
    pub fn key_at(&self, handle: Handle) -> Option<PointKey> {
        usize::try_from(handle)
            .ok()
            .and_then(|index| self.key_of_slot.get(index))
            .copied()
    }

    /// Current position of the point behind `key`.
    #[must_use]
    pub fn position(&self, key: PointKey) -> Option<Vec3> {
        self.slot(key)
            .and_then(|handle| self.registry.position(handle))
    }

    /// Key of the last published neighbor of `key`.
    ///
    /// Like the raw neighbor array this may be stale until the next solve; it
    /// resolves the published slot against the current layout.
    #[must_use]
    pub fn neighbor_of(&self, key: PointKey) -> Option<PointKey> {
        let handle = self.slot(key)?;
        self.key_at(self.registry.get_neighbor(handle))
    }
}

impl PointStore for StableRegistry {
    fn snapshot(&self) -> &[Vec3] {
        self.registry.snapshot()
    }

    fn publish_neighbors(&mut self, neighbors: Vec<i32>) -> bool {
        self.registry.publish_neighbors(neighbors)
    }

    fn len(&self) -> usize {
        self.registry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32) -> Vec3 {
        Vec3::new(x, 0.0, 0.0)
    }

    #[test]
    fn test_keys_survive_relocation() {
        let mut registry = StableRegistry::new();
        let a = registry.insert(p(0.0));
        let b = registry.insert(p(1.0));
        let c = registry.insert(p(2.0));

        registry.remove(a);

        assert!(!registry.contains(a));
        assert_eq!(registry.position(b), Some(p(1.0)));
        assert_eq!(registry.position(c), Some(p(2.0)));
        assert_eq!(registry.slot(c), Some(0));

        assert!(registry.update(c, p(9.0)));
        assert_eq!(registry.registry().snapshot(), &[p(9.0), p(1.0)]);
    }

    #[test]
    fn test_stale_key_is_ignored() {
        let mut registry = StableRegistry::new();
        let a = registry.insert(p(0.0));
        registry.remove(a);

        // Id is recycled with a new generation.
        let b = registry.insert(p(5.0));
        assert_eq!(a.id(), b.id());
        assert_eq!(a.generation(), Generation::FIRST);
        assert_eq!(b.generation().releases(), 1);
        assert!(b.generation() > a.generation());
        assert_eq!(format!("{b:?}"), "PointKey(0v1)");

        assert!(!registry.update(a, p(1.0)));
        assert!(registry.remove(a).is_none());
        assert_eq!(registry.position(b), Some(p(5.0)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_neighbor_of_maps_slots_to_keys() {
        let mut registry = StableRegistry::new();
        let a = registry.insert(p(0.0));
        let b = registry.insert(p(1.0));
        let c = registry.insert(p(5.0));

        assert!(registry.publish_neighbors(vec![1, 0, 1]));

        assert_eq!(registry.neighbor_of(a), Some(b));
        assert_eq!(registry.neighbor_of(b), Some(a));
        assert_eq!(registry.neighbor_of(c), Some(b));
    }

    #[test]
    fn test_neighbor_of_unsolved_is_none() {
        let mut registry = StableRegistry::new();
        let a = registry.insert(p(0.0));
        registry.insert(p(1.0));

        assert_eq!(registry.neighbor_of(a), None);
    }

    #[test]
    fn test_remove_last_keeps_tables_consistent() {
        let mut registry = StableRegistry::with_capacity(4);
        let a = registry.insert(p(0.0));
        let b = registry.insert(p(1.0));

        assert_eq!(registry.remove(b), Some(p(1.0)));
        assert_eq!(registry.slot(a), Some(0));
        assert_eq!(registry.key_at(0), Some(a));
        assert_eq!(registry.key_at(1), None);
    }
}
