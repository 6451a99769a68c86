//! Wander towards random targets inside a box.

use nn_registry::Vec3;
use rand::Rng;

/// Moves at a fixed speed towards a random target in `[-area, area]`.
#[derive(Clone, Copy, Debug)]
pub struct RandomMovement {
    target: Vec3,
    speed: f32,
    area: Vec3,
}

impl RandomMovement {
    /// Start with a fresh random target.
    pub fn new(speed: f32, area: Vec3, rng: &mut impl Rng) -> Self {
        let mut movement = Self {
            target: Vec3::ZERO,
            speed,
            area,
        };
        movement.retarget(rng);
        movement
    }

    /// Current destination.
    #[must_use]
    pub const fn target(&self) -> Vec3 {
        self.target
    }

    /// Position after moving for `dt` seconds. Picks a new target on arrival.
    pub fn step(&mut self, position: Vec3, dt: f32, rng: &mut impl Rng) -> Vec3 {
        let next = position.move_towards(self.target, dt * self.speed);
        if next == self.target {
            self.retarget(rng);
        }
        next
    }

    /// Pick a new target inside the area.
    pub fn retarget(&mut self, rng: &mut impl Rng) {
        self.target = Vec3::new(
            symmetric(rng, self.area.x),
            symmetric(rng, self.area.y),
            symmetric(rng, self.area.z),
        );
    }
}

/// Uniform in `[-extent, extent]`; zero for a degenerate axis.
fn symmetric(rng: &mut impl Rng, extent: f32) -> f32 {
    let extent = extent.abs();
    if extent > 0.0 {
        rng.gen_range(-extent..=extent)
    } else {
        0.0
    }
}
