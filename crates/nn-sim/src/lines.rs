//! Debug lines from each point to its nearest neighbor.

use nn_registry::Vec3;
use nn_tick::NeighborFrame;

/// Line-list vertex buffer rebuilt from published frames.
///
/// Vertices come in pairs `(point, neighbor)`. Reads only; never feeds back
/// into the system.
#[derive(Default)]
pub struct NeighborLines {
    vertices: Vec<Vec3>,
    generation: u64,
}

impl NeighborLines {
    /// Empty buffer; the first non-empty frame always rebuilds it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from `frame` unless it was already drawn. Returns whether
    /// anything changed.
    pub fn rebuild(&mut self, frame: &NeighborFrame) -> bool {
        if frame.generation() == self.generation {
            return false;
        }

        self.vertices.clear();
        for (from, to) in frame.pairs() {
            self.vertices.push(from);
            self.vertices.push(to);
        }
        self.generation = frame.generation();
        true
    }

    /// Frame generation currently drawn.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len() / 2
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// `(point, neighbor)` pairs in slot order.
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.vertices
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
    }

    /// Vertices as `x, y, z, x, y, z, ...` for a line-list upload.
    #[must_use]
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Average segment length, `None` when empty.
    #[must_use]
    pub fn mean_length(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        let total: f32 = self.segments().map(|(a, b)| a.distance(b)).sum();
        Some(total / self.len() as f32)
    }
}
