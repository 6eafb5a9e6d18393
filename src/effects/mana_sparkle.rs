//! Mana sparkles around a caster.
//!
//! Emission scales with the caster's mana fraction. Sparkles twinkle by
//! modulating brightness with their own phase; glows are larger, dimmer and
//! steady.

use glam::Vec3;
use log::debug;

use super::Effect;
use crate::config::ManaSparkleConfig;
use crate::emission::Emission;
use crate::mesh::{BatchMesh, Fade, Palette, QuadShape, QuadStyle, SizeOverLife, ViewBasis};
use crate::particle::Layer;
use crate::spawn::SpawnRng;
use crate::system::{ParticleSystem, StepStats};

const GLOW_SCALE: f32 = 3.0;
const GLOW_BRIGHTNESS: f32 = 0.6;

pub struct ManaSparkle {
    config: ManaSparkleConfig,
    system: ParticleSystem,
    rng: SpawnRng,
    anchor: Vec3,
    mana: f32,
    time: f32,
}

impl ManaSparkle {
    pub fn new(config: &ManaSparkleConfig) -> Self {
        let style = QuadStyle {
            shape: QuadShape::Billboard,
            fade: Fade::InOut {
                fade_in: 0.2,
                fade_out: 0.5,
            },
            size_over_life: SizeOverLife::Shrink,
            palette: Palette::new()
                .with(Layer::Sparkle, config.sparkle_color)
                .with(Layer::Glow, config.glow_color),
        };
        let system = ParticleSystem::new(
            "mana_sparkle",
            config.capacity,
            Emission::Scaled {
                max_rate: config.max_rate,
            },
            style,
        );
        debug!(
            "mana_sparkle: capacity {}, max rate {}/s",
            config.capacity, config.max_rate
        );
        Self {
            config: config.clone(),
            system,
            rng: SpawnRng::from_seed(config.seed),
            anchor: Vec3::ZERO,
            mana: 0.0,
            time: 0.0,
        }
    }

    pub fn set_anchor(&mut self, anchor: Vec3) {
        if anchor.is_finite() {
            self.anchor = anchor;
        }
    }

    /// Current mana as a fraction of the maximum, clamped to `[0, 1]`.
    pub fn set_mana_fraction(&mut self, mana: f32) {
        self.mana = if mana.is_finite() {
            mana.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    #[inline]
    pub fn mana_fraction(&self) -> f32 {
        self.mana
    }
}

impl Effect for ManaSparkle {
    fn name(&self) -> &'static str {
        self.system.name()
    }

    fn update(&mut self, dt: f32, view: &ViewBasis) -> StepStats {
        let Self {
            config,
            system,
            rng,
            anchor,
            mana,
            time,
        } = self;
        *time += dt.max(0.0);
        let t = *time;
        let rate = config.twinkle_rate;

        system.pool_mut().for_each_active_mut(|p| {
            if p.layer == Layer::Sparkle {
                p.brightness = 0.55 + 0.45 * (p.phase + t * rate).sin();
            }
        });

        let anchor = *anchor;
        system.step(dt, *mana, view, |p| {
            let glow = rng.chance(config.glow_chance);
            p.position =
                anchor + rng.random_in_disk(config.radius) + Vec3::Y * config.height.sample(rng);
            p.velocity = Vec3::new(
                rng.random_signed(0.1),
                config.rise_speed * rng.random_range(0.5, 1.0),
                rng.random_signed(0.1),
            );
            p.set_life(config.life.sample(rng));
            p.phase = rng.random_angle();
            if glow {
                p.layer = Layer::Glow;
                p.size = config.size * GLOW_SCALE;
                p.brightness = GLOW_BRIGHTNESS;
            } else {
                p.layer = Layer::Sparkle;
                p.size = config.size;
                p.brightness = 0.55 + 0.45 * p.phase.sin();
            }
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
        self.time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparkle() -> ManaSparkle {
        ManaSparkle::new(&ManaSparkleConfig {
            seed: Some(3),
            ..ManaSparkleConfig::default()
        })
    }

    #[test]
    fn test_no_mana_no_sparkles() {
        let mut fx = sparkle();
        let stats = fx.update(1.0, &ViewBasis::default());
        assert_eq!(stats.spawned, 0);
        assert!(fx.mesh().is_none());
    }

    #[test]
    fn test_mana_scales_rate() {
        let mut fx = sparkle();
        fx.set_mana_fraction(0.25);
        let stats = fx.update(1.0, &ViewBasis::default());
        assert_eq!(stats.spawned, 10);
    }

    #[test]
    fn test_sparkles_stay_around_anchor() {
        let mut fx = sparkle();
        let anchor = Vec3::new(-3.0, 1.0, 4.0);
        fx.set_anchor(anchor);
        fx.set_mana_fraction(1.0);
        fx.update(0.5, &ViewBasis::default());
        let config = ManaSparkleConfig::default();
        for p in fx.system.pool().iter_active() {
            let d = p.position - anchor;
            assert!(Vec3::new(d.x, 0.0, d.z).length() <= config.radius + 1e-4);
            assert!(d.y >= config.height.min - 1e-4 && d.y <= config.height.max + 1e-4);
            assert!(p.velocity.y > 0.0);
        }
    }

    #[test]
    fn test_twinkle_stays_in_range() {
        let mut fx = sparkle();
        fx.set_mana_fraction(1.0);
        let view = ViewBasis::default();
        for _ in 0..30 {
            fx.update(1.0 / 60.0, &view);
            for p in fx.system.pool().iter_active() {
                assert!((0.1 - 1e-6..=1.0 + 1e-6).contains(&p.brightness));
            }
        }
    }
}
