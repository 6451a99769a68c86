//! A moving point that keeps its registry slot up to date.

use nn_registry::{Handle, Vec3};
use nn_tick::NeighborSystem;
use rand::Rng;

use crate::movement::RandomMovement;

/// A pooled agent. Registered while enabled, idle in the pool otherwise.
pub struct Agent {
    position: Vec3,
    movement: RandomMovement,
    handle: Option<Handle>,
}

impl Agent {
    /// Disabled agent at the origin.
    #[must_use]
    pub const fn new(movement: RandomMovement) -> Self {
        Self {
            position: Vec3::ZERO,
            movement,
            handle: None,
        }
    }

    /// Last position pushed to the system.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Slot in the system, while enabled.
    #[must_use]
    pub const fn handle(&self) -> Option<Handle> {
        self.handle
    }

    /// Place the agent at `position` and register it.
    pub fn enable(&mut self, position: Vec3, system: &mut NeighborSystem) {
        self.position = position;
        self.handle = Some(system.insert(position));
    }

    /// Move for `dt` seconds and push the new position.
    pub fn step(&mut self, dt: f32, rng: &mut impl Rng, system: &mut NeighborSystem) {
        self.position = self.movement.step(self.position, dt, rng);
        if let Some(handle) = self.handle {
            system.update(handle, self.position);
        }
    }

    /// Deregister. The agent's slot is taken over by the last registered point.
    pub fn disable(&mut self, system: &mut NeighborSystem) {
        if let Some(handle) = self.handle.take() {
            system.remove(handle);
        }
    }
}
