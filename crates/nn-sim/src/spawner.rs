//! Spawns and despawns pooled agents.
//!
//! Despawning is LIFO: the most recently spawned agent always holds the last
//! registry slot, so removing it never relocates another agent's handle.

use nn_registry::Vec3;
use nn_tick::NeighborSystem;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracing::{debug, warn};

use crate::agent::Agent;
use crate::movement::RandomMovement;
use crate::pool::Pool;

/// Half-extent of the cube new agents appear in.
pub const SPAWN_EXTENT: f32 = 10.0;

/// Owns the agent pool and the agents currently registered.
pub struct Spawner {
    pool: Pool<Agent>,
    active: Vec<Agent>,
    rng: StdRng,
}

impl Spawner {
    /// Preallocate `start_pool_size` agents. Movement draws from its own stream
    /// seeded from `rng`.
    pub fn new(
        start_pool_size: usize,
        max_pool_size: usize,
        speed: f32,
        area: Vec3,
        mut rng: StdRng,
    ) -> Self {
        let mut movement_rng = StdRng::seed_from_u64(rng.next_u64());
        let pool = Pool::new(start_pool_size, max_pool_size, move || {
            Agent::new(RandomMovement::new(speed, area, &mut movement_rng))
        });

        Self {
            pool,
            active: Vec::with_capacity(start_pool_size),
            rng,
        }
    }

    /// Active agents in spawn order, which is also slot order.
    #[must_use]
    pub fn active(&self) -> &[Agent] {
        &self.active
    }

    /// Number of active agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Spawn up to `count` agents at random positions. Returns how many spawned.
    pub fn spawn(&mut self, count: usize, system: &mut NeighborSystem) -> usize {
        let mut spawned = 0;
        for _ in 0..count {
            let Some(mut agent) = self.pool.take() else {
                warn!(
                    requested = count,
                    spawned,
                    active = self.active.len(),
                    "agent pool exhausted"
                );
                break;
            };

            let position = Vec3::new(
                self.rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
                self.rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
                self.rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
            );
            agent.enable(position, system);
            self.active.push(agent);
            spawned += 1;
        }

        debug!(spawned, active = self.active.len(), "spawned agents");
        spawned
    }

    /// Despawn up to `count` of the most recently spawned agents.
    pub fn despawn(&mut self, count: usize, system: &mut NeighborSystem) -> usize {
        let mut despawned = 0;
        while despawned < count {
            let Some(mut agent) = self.active.pop() else {
                break;
            };
            agent.disable(system);
            self.pool.give(agent);
            despawned += 1;
        }

        debug!(despawned, active = self.active.len(), "despawned agents");
        despawned
    }

    /// Advance every active agent by `dt` seconds.
    pub fn step(&mut self, dt: f32, system: &mut NeighborSystem) {
        for agent in &mut self.active {
            agent.step(dt, &mut self.rng, system);
        }
    }
}
