//! Wind streaks.
//!
//! Thin velocity-aligned streaks spawn in a box around the anchor (usually the
//! camera focus), shifted upwind so they blow across the view. The emission
//! rate follows the wind intensity.

use glam::Vec3;
use log::debug;

use super::Effect;
use crate::config::WindConfig;
use crate::emission::Emission;
use crate::mesh::{BatchMesh, Fade, Palette, QuadShape, QuadStyle, SizeOverLife, ViewBasis};
use crate::particle::Layer;
use crate::spawn::SpawnRng;
use crate::system::{ParticleSystem, StepStats};

/// Frequency of the vertical wobble, radians per second.
const WOBBLE_RATE: f32 = 2.5;

pub struct Wind {
    config: WindConfig,
    system: ParticleSystem,
    rng: SpawnRng,
    intensity: f32,
    anchor: Vec3,
    direction: Vec3,
    time: f32,
}

impl Wind {
    pub fn new(config: &WindConfig) -> Self {
        let style = QuadStyle {
            shape: QuadShape::Streak {
                stretch: config.stretch,
            },
            fade: Fade::InOut {
                fade_in: 0.2,
                fade_out: 0.3,
            },
            size_over_life: SizeOverLife::Constant,
            palette: Palette::new().with(Layer::Gust, config.color),
        };
        let system = ParticleSystem::new(
            "wind",
            config.capacity,
            Emission::Scaled {
                max_rate: config.max_rate,
            },
            style,
        );
        let rng = SpawnRng::from_seed(config.seed);
        debug!(
            "wind: capacity {}, max rate {}/s, seeded {}",
            config.capacity,
            config.max_rate,
            rng.is_seeded()
        );
        Self {
            config: config.clone(),
            system,
            rng,
            intensity: 0.0,
            anchor: Vec3::ZERO,
            direction: config.direction.try_normalize().unwrap_or(Vec3::X),
            time: 0.0,
        }
    }

    /// Wind strength in `[0, 1]`. Out-of-range values are clamped.
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

    /// Centre of the spawn area. Non-finite positions are ignored.
    pub fn set_anchor(&mut self, anchor: Vec3) {
        if anchor.is_finite() {
            self.anchor = anchor;
        }
    }

    /// Direction the wind blows towards. A zero direction is ignored.
    pub fn set_direction(&mut self, direction: Vec3) {
        if let Some(direction) = direction.try_normalize() {
            self.direction = direction;
        }
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }
}

impl Effect for Wind {
    fn name(&self) -> &'static str {
        self.system.name()
    }

    fn update(&mut self, dt: f32, view: &ViewBasis) -> StepStats {
        let Self {
            config,
            system,
            rng,
            intensity,
            anchor,
            direction,
            time,
        } = self;
        *time += dt.max(0.0);
        let t = *time;

        let lift = config.lift;
        system
            .pool_mut()
            .for_each_active_mut(|p| p.velocity.y = lift * (p.phase + t * WOBBLE_RATE).sin());

        let upwind = *anchor - *direction * config.area.x;
        system.step(dt, *intensity, view, |p| {
            let speed = config.speed * (1.0 + rng.random_signed(config.speed_jitter));
            p.position = upwind + rng.random_in_box(config.area);
            p.velocity = *direction * speed;
            p.set_life(config.life.sample(rng));
            p.layer = Layer::Gust;
            p.size = config.size;
            p.brightness = rng.random_range(0.7, 1.0);
            p.phase = rng.random_angle();
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

    fn seeded() -> Wind {
        Wind::new(&WindConfig {
            seed: Some(5),
            ..WindConfig::default()
        })
    }

    #[test]
    fn test_calm_wind_spawns_nothing() {
        let mut wind = seeded();
        let view = ViewBasis::default();
        for _ in 0..60 {
            wind.update(1.0 / 60.0, &view);
        }
        assert_eq!(wind.active_count(), 0);
        assert!(wind.mesh().is_none());
    }

    #[test]
    fn test_intensity_scales_emission() {
        let mut wind = seeded();
        wind.set_intensity(0.5);
        let stats = wind.update(1.0, &ViewBasis::default());
        assert_eq!(stats.spawned, 40);
        assert_eq!(wind.mesh().unwrap().quad_count(), 40);
    }

    #[test]
    fn test_streaks_move_downwind() {
        let mut wind = seeded();
        wind.set_direction(Vec3::new(0.0, 0.0, 2.0));
        wind.set_intensity(1.0);
        wind.update(0.1, &ViewBasis::default());
        for p in wind.system.pool().iter_active() {
            assert!(p.velocity.z > 0.0);
            assert_eq!(p.velocity.x, 0.0);
        }
    }

    #[test]
    fn test_bad_signals_are_clamped() {
        let mut wind = seeded();
        wind.set_intensity(f32::NAN);
        assert_eq!(wind.intensity(), 0.0);
        wind.set_intensity(3.0);
        assert_eq!(wind.intensity(), 1.0);
        wind.set_direction(Vec3::ZERO);
        assert!((wind.direction().length() - 1.0).abs() < 1e-5);
        wind.set_anchor(Vec3::splat(f32::INFINITY));
        assert!(wind.anchor.is_finite());
    }
}
