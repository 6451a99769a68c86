//! Dense registry of moving 3D points.
//!
//! Points are addressed by dense `i32` slot handles and stored contiguously so
//! a solver can read them as one slice.
//!
//! # Storage Model
//!
//! ```text
//!  slot:      0     1     2     3   |  4     5
//!  positions: p0    p1    p2    p3  |  --    --     (stale head-room)
//!  neighbors: n0    n1    n2    n3  |  --    --
//!                                   ^ count          ^ capacity
//!
//!  remove(1):  p3 moves into slot 1, count = 3, capacity = 3
//! ```
//!
//! Handles are *not* stable identities: see [`PointRegistry`] for the
//! swap-remove rules, and [`StableRegistry`] for generation-tagged keys.

mod error;
mod point;
mod registry;
mod stable;
mod store;

pub use error::{RegistryError, RegistryResult};
pub use point::Vec3;
pub use registry::{Handle, NO_NEIGHBOR, PointRegistry, Removed};
pub use stable::{Generation, PointKey, StableRegistry};
pub use store::PointStore;
