//! Dust devil: a swirling column of dust that follows an anchor.
//!
//! Velocities are recomputed every frame from the particle's offset to the
//! current anchor: a tangential swirl, a pull towards the column wall (which
//! widens with height) and, for dust, the rise speed stored in `phase`.
//! Debris particles hug the ground in a wider ring.

use glam::Vec3;
use log::debug;

use super::Effect;
use crate::config::DustDevilConfig;
use crate::emission::Emission;
use crate::mesh::{BatchMesh, Fade, Palette, QuadShape, QuadStyle, SizeOverLife, ViewBasis};
use crate::particle::{Layer, Particle};
use crate::spawn::{tangent_velocity, SpawnRng};
use crate::system::{ParticleSystem, StepStats};

/// Strength of the pull towards the column wall, per second.
const WALL_PULL: f32 = 4.0;
/// Ground ring radius relative to the column base.
const DEBRIS_RING: f32 = 1.4;

pub struct DustDevil {
    config: DustDevilConfig,
    system: ParticleSystem,
    rng: SpawnRng,
    anchor: Vec3,
    intensity: f32,
}

impl DustDevil {
    pub fn new(config: &DustDevilConfig) -> Self {
        let style = QuadStyle {
            shape: QuadShape::Billboard,
            fade: Fade::InOut {
                fade_in: 0.15,
                fade_out: 0.4,
            },
            size_over_life: SizeOverLife::Grow { start: 0.5 },
            palette: Palette::new()
                .with(Layer::Dust, config.dust_color)
                .with(Layer::Debris, config.debris_color),
        };
        let system = ParticleSystem::new(
            "dust_devil",
            config.capacity,
            Emission::Scaled {
                max_rate: config.max_rate,
            },
            style,
        );
        debug!(
            "dust_devil: capacity {}, radius {}, angular speed {}",
            config.capacity, config.radius, config.angular_speed
        );
        Self {
            config: config.clone(),
            system,
            rng: SpawnRng::from_seed(config.seed),
            anchor: Vec3::ZERO,
            intensity: 1.0,
        }
    }

    /// Move the base of the column. Non-finite positions are ignored.
    pub fn set_anchor(&mut self, anchor: Vec3) {
        if anchor.is_finite() {
            self.anchor = anchor;
        }
    }

    #[inline]
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    /// Column strength in `[0, 1]`. Full strength by default.
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Radius of the column wall at `height` above the base.
    fn wall_radius(config: &DustDevilConfig, layer: Layer, height: f32) -> f32 {
        match layer {
            Layer::Debris => config.radius * DEBRIS_RING,
            _ => config.radius + config.flare * height.max(0.0),
        }
    }

    fn swirl(config: &DustDevilConfig, anchor: Vec3, p: &mut Particle) {
        let offset = p.position - anchor;
        let horizontal = Vec3::new(offset.x, 0.0, offset.z);
        let wall = Self::wall_radius(config, p.layer, offset.y);
        let radial = horizontal.try_normalize().unwrap_or(Vec3::X);
        let pull = radial * (wall - horizontal.length()) * WALL_PULL;
        let swirl = tangent_velocity(horizontal, config.angular_speed * wall);
        let rise = if p.layer == Layer::Debris { 0.0 } else { p.phase };
        p.velocity = swirl + pull + Vec3::Y * rise;
    }
}

impl Effect for DustDevil {
    fn name(&self) -> &'static str {
        self.system.name()
    }

    fn update(&mut self, dt: f32, view: &ViewBasis) -> StepStats {
        let Self {
            config,
            system,
            rng,
            anchor,
            intensity,
        } = self;
        let anchor = *anchor;

        system
            .pool_mut()
            .for_each_active_mut(|p| Self::swirl(config, anchor, p));

        system.step(dt, *intensity, view, |p| {
            let debris = rng.chance(config.debris_chance);
            let angle = rng.random_angle();
            let ring = Vec3::new(angle.cos(), 0.0, angle.sin());
            p.set_life(config.life.sample(rng));
            if debris {
                p.position = anchor + ring * config.radius * DEBRIS_RING;
                p.layer = Layer::Debris;
                p.size = config.size * 0.6;
                p.phase = 0.0;
            } else {
                let r = config.radius * rng.random_range(0.6, 1.0);
                p.position = anchor + ring * r + Vec3::Y * rng.random_range(0.0, 0.3);
                p.layer = Layer::Dust;
                p.size = config.size;
                p.phase = config.rise_speed.sample(rng);
                p.velocity = Vec3::Y * p.phase;
            }
            p.brightness = rng.random_range(0.7, 1.0);
        })
    }

    fn mesh(&self) -> Option<&BatchMesh> {
        self.system.mesh()
    }

    fn active_count(&self) -> usize {
        self.system.pool().active_count()
    }

    fn reset(&mut self) {
        self.system.reset();
    }
}
