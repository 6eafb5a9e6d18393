//! Meteor shower.
//!
//! Meteors appear above a target area and fall as long streaks. A meteor
//! that reaches the ground is killed and replaced by a burst of debris that
//! arcs under gravity and dies when it lands. Meteors and debris share one
//! pool; debris is drawn as short velocity-aligned sparks.

use glam::Vec3;
use log::{debug, trace};

use super::Effect;
use crate::config::MeteorConfig;
use crate::emission::Emission;
use crate::mesh::{BatchMesh, Fade, Palette, QuadShape, QuadStyle, SizeOverLife, ViewBasis};
use crate::particle::Layer;
use crate::spawn::SpawnRng;
use crate::system::{ParticleSystem, StepStats};

/// Cone half-angle of the debris burst around +Y, radians.
const DEBRIS_SPREAD: f32 = 1.2;

pub struct MeteorShower {
    config: MeteorConfig,
    system: ParticleSystem,
    rng: SpawnRng,
    target: Vec3,
    intensity: f32,
    fall: Vec3,
    impacts: Vec<Vec3>,
    total_impacts: u64,
}

impl MeteorShower {
    pub fn new(config: &MeteorConfig) -> Self {
        let style = QuadStyle {
            shape: QuadShape::Streak {
                stretch: config.stretch,
            },
            fade: Fade::Constant,
            size_over_life: SizeOverLife::Constant,
            palette: Palette::new()
                .with(Layer::Core, config.core_color)
                .with(Layer::Debris, config.debris_color),
        };
        let system = ParticleSystem::new(
            "meteors",
            config.capacity,
            Emission::Scaled {
                max_rate: config.max_rate,
            },
            style,
        );
        let rng = SpawnRng::from_seed(config.seed);
        debug!(
            "meteors: capacity {}, max rate {}/s, {} debris per impact",
            config.capacity, config.max_rate, config.debris_count
        );
        let fall = config
            .fall_direction
            .try_normalize()
            .filter(|d| d.y < 0.0)
            .unwrap_or(Vec3::NEG_Y);
        Self {
            config: config.clone(),
            system,
            rng,
            target: Vec3::ZERO,
            intensity: 0.0,
            fall,
            impacts: Vec::with_capacity(config.capacity),
            total_impacts: 0,
        }
    }

    /// Centre of the impact area. Only x and z are used; impacts happen at
    /// the configured ground height.
    pub fn set_target(&mut self, target: Vec3) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Shower strength in `[0, 1]`.
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    #[inline]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Impacts since construction or the last reset.
    #[inline]
    pub fn total_impacts(&self) -> u64 {
        self.total_impacts
    }
}

/// Seconds a meteor of `speed` needs to fall `height` along `fall`.
fn fall_time(height: f32, fall: Vec3, speed: f32) -> f32 {
    let vertical = speed * -fall.y;
    if vertical > 0.0 {
        height / vertical
    } else {
        0.0
    }
}

impl Effect for MeteorShower {
    fn name(&self) -> &'static str {
        self.system.name()
    }

    fn update(&mut self, dt: f32, view: &ViewBasis) -> StepStats {
        let dt = dt.max(0.0);
        let gravity = self.config.gravity;
        let ground = self.config.ground_height;

        // Forces, then motion, then terminal events.
        self.system.pool_mut().for_each_active_mut(|p| {
            if p.layer == Layer::Debris {
                p.velocity.y -= gravity * dt;
                p.brightness = 0.4 + 0.6 * p.life_fraction();
            }
        });
        let mut expired = self.system.advance(dt);

        let impacts = &mut self.impacts;
        impacts.clear();
        expired += self.system.pool_mut().retire_where(|p| {
            if p.position.y > ground {
                return false;
            }
            if p.layer == Layer::Core {
                impacts.push(Vec3::new(p.position.x, ground, p.position.z));
            }
            true
        });
        self.total_impacts += self.impacts.len() as u64;

        let mut spawned = 0;
        let mut dropped = 0;
        let Self {
            config,
            system,
            rng,
            impacts,
            fall,
            target,
            intensity,
            ..
        } = self;
        for &impact in impacts.iter() {
            trace!("meteor impact at {:?}", impact);
            let stats = system.spawn_many(config.debris_count, |p| {
                let dir = rng.random_in_cone(Vec3::Y, DEBRIS_SPREAD);
                p.position = impact + Vec3::Y * 0.01;
                p.velocity = dir * config.debris_speed.sample(rng);
                p.set_life(config.debris_life.sample(rng));
                p.layer = Layer::Debris;
                p.size = config.debris_size;
            });
            spawned += stats.spawned;
            dropped += stats.dropped;
        }

        let fall = *fall;
        let target = *target;
        let stats = system.emit(*intensity, dt, |p| {
            let speed = config.speed.sample(rng);
            let seconds = fall_time(config.spawn_height, fall, speed);
            let landing = target + rng.random_in_disk(config.area_radius);
            p.position = Vec3::new(landing.x, ground, landing.z) - fall * speed * seconds;
            p.velocity = fall * speed;
            // Outlive the fall so the meteor always lands.
            p.set_life(seconds * 1.5 + 0.5);
            p.layer = Layer::Core;
            p.size = config.meteor_size;
            p.brightness = rng.random_range(1.0, 1.4);
        });
        spawned += stats.spawned;
        dropped += stats.dropped;

        system.rebuild(view);
        StepStats {
            expired,
            spawned,
            dropped,
            active: system.pool().active_count(),
        }
    }

    fn mesh(&self) -> Option<&BatchMesh> {
        self.system.mesh()
    }

    fn active_count(&self) -> usize {
        self.system.pool().active_count()
    }

    fn reset(&mut self) {
        self.system.reset();
        self.total_impacts = 0;
    }
}
