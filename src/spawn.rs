//! Random sampling for particle spawning.
//!
//! Every effect owns one [`SpawnRng`]. Seeded RNGs replay the same particles
//! for the same frame sequence; unseeded RNGs draw their seed from the OS.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};

/// Random source with helpers for common spawn patterns.
///
/// ```ignore
/// let mut rng = SpawnRng::from_seed(Some(7));
/// pool.spawn(|p| {
///     p.position = anchor + rng.random_in_disk(2.0);
///     p.set_life(rng.random_range(0.8, 1.6));
/// });
/// ```
#[derive(Debug, Clone)]
pub struct SpawnRng {
    rng: SmallRng,
    seeded: bool,
}

impl SpawnRng {
    /// Seeded when `seed` is `Some`, from entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self {
                rng: SmallRng::seed_from_u64(seed),
                seeded: true,
            },
            None => Self {
                rng: SmallRng::from_entropy(),
                seeded: false,
            },
        }
    }

    /// Whether this RNG replays a fixed sequence.
    #[inline]
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random f32 in `[-extent, extent)`.
    #[inline]
    pub fn random_signed(&mut self, extent: f32) -> f32 {
        self.random_range(-extent.abs(), extent.abs())
    }

    /// `true` with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.random() < p
    }

    // ========== Position helpers ==========

    /// Random point on the surface of a sphere of given radius.
    pub fn random_on_sphere(&mut self, radius: f32) -> Vec3 {
        // Uniform in z and angle gives a uniform surface distribution.
        let z = self.random_range(-1.0, 1.0);
        let theta = self.random_range(0.0, TAU);
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * theta.cos(), z, r * theta.sin()) * radius
    }

    /// Random point inside a box of given half-extents, centred at origin.
    pub fn random_in_box(&mut self, half_extents: Vec3) -> Vec3 {
        Vec3::new(
            self.random_signed(half_extents.x),
            self.random_signed(half_extents.y),
            self.random_signed(half_extents.z),
        )
    }

    /// Random point inside a disk in the XZ plane at y=0.
    pub fn random_in_disk(&mut self, radius: f32) -> Vec3 {
        let theta = self.random_range(0.0, TAU);
        let r = radius * self.random().sqrt(); // sqrt for uniform disk

        Vec3::new(r * theta.cos(), 0.0, r * theta.sin())
    }

    /// Random point on a ring (circle) in the XZ plane at y=0.
    pub fn random_on_ring(&mut self, radius: f32) -> Vec3 {
        let theta = self.random_range(0.0, TAU);
        Vec3::new(radius * theta.cos(), 0.0, radius * theta.sin())
    }

    // ========== Direction/velocity helpers ==========

    /// Random unit vector (uniformly distributed on unit sphere).
    pub fn random_direction(&mut self) -> Vec3 {
        self.random_on_sphere(1.0)
    }

    /// Random unit vector within `spread` radians of `axis`.
    ///
    /// A zero `axis` is treated as +Y.
    pub fn random_in_cone(&mut self, axis: Vec3, spread: f32) -> Vec3 {
        let axis = axis.try_normalize().unwrap_or(Vec3::Y);
        let up = if axis.y.abs() > 0.9 { Vec3::X } else { Vec3::Y };
        let right = up.cross(axis).normalize();
        let forward = axis.cross(right);

        let angle = self.random_range(0.0, TAU);
        let tilt = self.random_range(0.0, spread.clamp(0.0, PI));
        let dir = right * (tilt.sin() * angle.cos())
            + forward * (tilt.sin() * angle.sin())
            + axis * tilt.cos();
        dir.try_normalize().unwrap_or(axis)
    }

    /// Random angle in `[0, TAU)`.
    #[inline]
    pub fn random_angle(&mut self) -> f32 {
        self.random_range(0.0, TAU)
    }
}

/// Velocity tangent to `offset` around the Y axis (counter-clockwise from
/// above).
///
/// At the axis itself the tangent is undefined and +X is used.
pub fn tangent_velocity(offset: Vec3, speed: f32) -> Vec3 {
    let tangent = Vec3::new(offset.z, 0.0, -offset.x);
    if tangent.length_squared() > 0.0001 {
        tangent.normalize() * speed
    } else {
        Vec3::new(speed, 0.0, 0.0)
    }
}
