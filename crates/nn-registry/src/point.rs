//! 3D positions.

use std::fmt;

/// A point in 3D space.
///
/// `#[repr(C)]` so a slice of positions can be handed to a renderer as
/// a flat `f32` buffer.
#[derive(Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean distance. Monotonic with [`Vec3::distance`].
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Step from `self` towards `target` by at most `max_delta`.
    ///
    /// Lands exactly on `target` once it is within reach.
    #[must_use]
    pub fn move_towards(self, target: Self, max_delta: f32) -> Self {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let dz = target.z - self.z;
        let dist_sq = dx * dx + dy * dy + dz * dz;

        if dist_sq == 0.0 || (max_delta >= 0.0 && dist_sq <= max_delta * max_delta) {
            return target;
        }

        let scale = max_delta / dist_sq.sqrt();
        Self::new(self.x + dx * scale, self.y + dy * scale, self.z + dz * scale)
    }
}

impl From<(f32, f32, f32)> for Vec3 {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl fmt::Debug for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_squared() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 6.0, 3.0);
        assert_eq!(a.distance_squared(b), 25.0);
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn test_move_towards_partial_step() {
        let from = Vec3::ZERO;
        let to = Vec3::new(10.0, 0.0, 0.0);
        assert_eq!(from.move_towards(to, 2.5), Vec3::new(2.5, 0.0, 0.0));
    }

    #[test]
    fn test_move_towards_snaps_to_target() {
        let from = Vec3::new(0.0, 0.0, 0.0);
        let to = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(from.move_towards(to, 5.0), to);
        assert_eq!(to.move_towards(to, 0.0), to);
    }

    #[test]
    fn test_cast_to_floats() {
        let points = [Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)];
        let flat: &[f32] = bytemuck::cast_slice(&points);
        assert_eq!(flat, &[1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
