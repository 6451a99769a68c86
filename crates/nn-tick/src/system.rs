//! Registry + solver + timer, owned by the simulation thread.

use std::time::{Duration, Instant};

use nn_registry::{
    Handle, NO_NEIGHBOR, PointKey, PointRegistry, PointStore, StableRegistry, Vec3,
};
use nn_solver::NeighborSolver;
use tracing::{debug, trace, warn};

use crate::{ConfigResult, Expiry, NeighborFeed, NeighborFrame, Phase, Schedule, SystemConfig};

/// What a call to [`NeighborSystem::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Interval not yet elapsed.
    Waiting,
    /// Interval elapsed with fewer than two points; nothing published.
    Skipped,
    /// Interval elapsed while a recompute was in flight.
    /// [`NeighborSystem::tick`] solves inline and never reports this.
    Dropped,
    /// A new frame was solved and published.
    Solved,
}

/// Running counters for the recompute loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Frames published.
    pub solves: u64,
    /// Expiries with fewer than two points.
    pub skipped: u64,
    /// Expiries that arrived while a recompute was in flight. Stays zero
    /// while solves run inline in [`NeighborSystem::tick`].
    pub dropped: u64,
    /// Wall time of the most recent solve.
    pub last_duration: Duration,
}

/// A point store plus the machinery that periodically recomputes its
/// nearest-neighbor array.
///
/// The host constructs one and passes it to whoever registers points; there is
/// no global instance. All mutation happens through `&mut self` on the owning
/// thread, and [`NeighborSystem::tick`] blocks while the solver fans out.
pub struct NeighborSystem<S = PointRegistry> {
    store: S,
    solver: NeighborSolver,
    schedule: Schedule,
    feed: NeighborFeed,
    stats: SolveStats,
    config: SystemConfig,
}

impl<S: PointStore> NeighborSystem<S> {
    /// Build a system around an existing store.
    pub fn with_store(config: SystemConfig, store: S) -> ConfigResult<Self> {
        config.validate()?;
        let solver = config.build_solver()?;

        debug!(
            interval = config.update_interval,
            capacity = config.initial_capacity,
            batch_size = solver.batch_size(),
            workers = solver.worker_threads(),
            "neighbor system configured"
        );

        Ok(Self {
            store,
            solver,
            schedule: Schedule::new(config.update_interval),
            feed: NeighborFeed::new(),
            stats: SolveStats::default(),
            config,
        })
    }

    /// Settings the system was built with.
    #[must_use]
    pub const fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Read access to the point store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Counters since construction.
    #[must_use]
    pub const fn stats(&self) -> SolveStats {
        self.stats
    }

    /// Recompute state; `Idle` between calls.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.schedule.phase()
    }

    /// A read handle for presentation or other threads.
    #[must_use]
    pub fn feed(&self) -> NeighborFeed {
        self.feed.clone()
    }

    /// The most recently published frame.
    #[must_use]
    pub fn latest(&self) -> std::sync::Arc<NeighborFrame> {
        self.feed.latest()
    }

    /// Number of live points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Advance the timer by `dt` seconds and recompute if it expired.
    ///
    /// The solve runs to completion inside this call, and `&mut self` rules
    /// out a second `tick` while it does. The schedule is therefore always
    /// [`Phase::Idle`] on entry and this never returns
    /// [`TickOutcome::Dropped`]. A long solve shows up in
    /// [`SolveStats::last_duration`] and a `warn!` instead.
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        match self.schedule.advance(dt) {
            Expiry::Waiting => TickOutcome::Waiting,
            Expiry::Dropped => {
                self.stats.dropped += 1;
                TickOutcome::Dropped
            }
            Expiry::Due => self.run_due(),
        }
    }

    /// Recompute immediately, ignoring the timer.
    ///
    /// Follows the same rules as an expiry: nothing happens with fewer than two
    /// points.
    pub fn recompute_now(&mut self) -> TickOutcome {
        if self.schedule.phase() == Phase::Recomputing {
            self.stats.dropped += 1;
            return TickOutcome::Dropped;
        }
        self.run_due()
    }

    fn run_due(&mut self) -> TickOutcome {
        if self.store.len() <= 1 {
            self.stats.skipped += 1;
            return TickOutcome::Skipped;
        }

        self.schedule.begin();
        self.recompute();
        self.schedule.finish();

        TickOutcome::Solved
    }

    fn recompute(&mut self) {
        let started = Instant::now();

        let positions = self.store.snapshot();
        let neighbors = self.solver.solve(positions);
        let frame = NeighborFrame::new(self.stats.solves + 1, positions.to_vec(), neighbors.clone());

        if !self.store.publish_neighbors(neighbors) {
            warn!("solved neighbors no longer match the registry layout");
        }
        self.feed.publish(frame);

        let elapsed = started.elapsed();
        self.stats.solves += 1;
        self.stats.last_duration = elapsed;

        trace!(
            points = self.store.len(),
            generation = self.stats.solves,
            elapsed_us = elapsed.as_micros() as u64,
            "published neighbor frame"
        );

        if elapsed.as_secs_f32() > self.config.update_interval {
            warn!(
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                interval = self.config.update_interval,
                "neighbor solve overran its interval"
            );
        }
    }
}

impl NeighborSystem<PointRegistry> {
    /// Build a system with a fresh slot-addressed registry.
    pub fn new(config: SystemConfig) -> ConfigResult<Self> {
        let registry = PointRegistry::with_capacity(config.initial_capacity);
        Self::with_store(config, registry)
    }

    /// Shorthand for the two settings every host sets.
    pub fn configure(update_interval: f32, initial_capacity: usize) -> ConfigResult<Self> {
        Self::new(SystemConfig::new(update_interval, initial_capacity))
    }

    /// See [`PointRegistry::insert`].
    pub fn insert(&mut self, position: Vec3) -> Handle {
        self.store.insert(position)
    }

    /// See [`PointRegistry::update`].
    pub fn update(&mut self, handle: Handle, position: Vec3) -> bool {
        self.store.update(handle, position)
    }

    /// See [`PointRegistry::remove`]. Relocates the last point into `handle`.
    pub fn remove(&mut self, handle: Handle) -> bool {
        self.store.remove(handle).is_some()
    }

    /// Published neighbor of `handle`, or [`NO_NEIGHBOR`].
    #[must_use]
    pub fn get_neighbor(&self, handle: Handle) -> i32 {
        self.store.get_neighbor(handle)
    }

    /// Published neighbors of all live slots.
    #[must_use]
    pub fn neighbors(&self) -> &[i32] {
        self.store.neighbors()
    }
}

impl NeighborSystem<StableRegistry> {
    /// Build a system whose points are addressed by [`PointKey`].
    pub fn new_stable(config: SystemConfig) -> ConfigResult<Self> {
        let registry = StableRegistry::with_capacity(config.initial_capacity);
        Self::with_store(config, registry)
    }

    /// Register a point and return its stable key.
    pub fn insert(&mut self, position: Vec3) -> PointKey {
        self.store.insert(position)
    }

    /// Move the point behind `key`. `false` for a stale key.
    pub fn update(&mut self, key: PointKey, position: Vec3) -> bool {
        self.store.update(key, position)
    }

    /// Remove the point behind `key`. `false` for a stale key.
    pub fn remove(&mut self, key: PointKey) -> bool {
        self.store.remove(key).is_some()
    }

    /// Key of the last published neighbor of `key`.
    #[must_use]
    pub fn neighbor_of(&self, key: PointKey) -> Option<PointKey> {
        self.store.neighbor_of(key)
    }

    /// Published neighbor slot of `key`, or [`NO_NEIGHBOR`].
    #[must_use]
    pub fn get_neighbor(&self, key: PointKey) -> i32 {
        self.store
            .slot(key)
            .map_or(NO_NEIGHBOR, |handle| self.store.registry().get_neighbor(handle))
    }
}
