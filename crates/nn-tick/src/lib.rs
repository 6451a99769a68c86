//! Interval-driven nearest-neighbor recompute.
//!
//! # Tick Model
//!
//! ```text
//! Every frame (simulation thread):
//! ┌─────────────────────────────────────────────────────────────┐
//! │  drivers: insert / update / remove        (O(1) each)       │
//! │  system.tick(dt)                                            │
//! │    timer < interval  → return                               │
//! │    timer expired     → snapshot positions                   │
//! │                      → solve in parallel batches (blocks)   │
//! │                      → publish registry array + feed frame  │
//! └─────────────────────────────────────────────────────────────┘
//! Any thread:
//!    feed.latest() → last complete frame (never a partial one)
//! ```
//!
//! Published neighbors lag true positions by at most one interval.

mod config;
mod feed;
mod schedule;
mod system;

pub use config::{ConfigError, ConfigResult, SystemConfig};
pub use feed::{NeighborFeed, NeighborFrame};
pub use schedule::{Expiry, Phase, Schedule};
pub use system::{NeighborSystem, SolveStats, TickOutcome};
