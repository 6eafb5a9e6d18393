//! Particle records and the closed set of visual layers.
//!
//! A [`Particle`] lives in a slot of a [`ParticlePool`](crate::ParticlePool)
//! for its whole lifetime. It is never removed: an expired particle keeps its
//! slot with `life` set to [`INACTIVE_LIFE`] until the slot is respawned.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Life value written into a slot when it is deactivated.
pub const INACTIVE_LIFE: f32 = -1.0;

/// Smallest life a spawned particle may have.
///
/// Spawn initialisers that leave `life` at zero, negative or NaN get this
/// instead so the freshly spawned slot is active for at least one tick.
pub const MIN_LIFE: f32 = 1.0e-3;

/// Visual layer of a particle.
///
/// Effects tag particles with a layer; the mesh batcher looks the tint up in a
/// [`Palette`](crate::Palette) indexed by layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Layer {
    /// Bright centre of an effect (comet head glow, meteor body).
    #[default]
    Core,
    /// Soft halo around the core.
    Glow,
    /// Main body of a trailing effect.
    Tail,
    /// Sparse, long-lived hot fragments.
    Ember,
    /// Airborne dust and sand.
    Dust,
    /// Heavy fragments thrown off by impacts.
    Debris,
    /// Magical twinkles.
    Sparkle,
    /// Wind streaks.
    Gust,
}

impl Layer {
    /// Number of layers.
    pub const COUNT: usize = 8;

    /// All layers in table order.
    pub const ALL: [Layer; Layer::COUNT] = [
        Layer::Core,
        Layer::Glow,
        Layer::Tail,
        Layer::Ember,
        Layer::Dust,
        Layer::Debris,
        Layer::Sparkle,
        Layer::Gust,
    ];

    /// Position of this layer in a [`Palette`](crate::Palette) table.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Layer::Core => 0,
            Layer::Glow => 1,
            Layer::Tail => 2,
            Layer::Ember => 3,
            Layer::Dust => 4,
            Layer::Debris => 5,
            Layer::Sparkle => 6,
            Layer::Gust => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Layer::Core => "Core",
            Layer::Glow => "Glow",
            Layer::Tail => "Tail",
            Layer::Ember => "Ember",
            Layer::Dust => "Dust",
            Layer::Debris => "Debris",
            Layer::Sparkle => "Sparkle",
            Layer::Gust => "Gust",
        }
    }
}

/// A single pooled particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// World-space position.
    pub position: Vec3,
    /// World-space velocity in units per second.
    pub velocity: Vec3,
    /// Remaining life in seconds. Inactive when not strictly positive.
    pub life: f32,
    /// Life the particle was spawned with.
    pub max_life: f32,
    /// Visual layer, selects the tint.
    pub layer: Layer,
    /// RGB multiplier applied on top of the layer tint.
    pub brightness: f32,
    /// Half-extent of the rendered quad in world units.
    pub size: f32,
    /// Free per-effect parameter (twinkle phase, swirl angle, ...).
    pub phase: f32,
}

impl Particle {
    /// An inactive particle, the state of every slot after pool init.
    pub const INACTIVE: Particle = Particle {
        position: Vec3::ZERO,
        velocity: Vec3::ZERO,
        life: INACTIVE_LIFE,
        max_life: 0.0,
        layer: Layer::Core,
        brightness: 1.0,
        size: 0.1,
        phase: 0.0,
    };

    /// Whether the particle is alive.
    ///
    /// NaN life counts as inactive.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.life > 0.0
    }

    /// Remaining life as a fraction of `max_life`, in `[0, 1]`.
    ///
    /// 1.0 right after spawn, 0.0 at expiry.
    #[inline]
    pub fn life_fraction(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Age as a fraction of `max_life`, in `[0, 1]`.
    #[inline]
    pub fn age_fraction(&self) -> f32 {
        1.0 - self.life_fraction()
    }

    /// Set both `life` and `max_life`.
    #[inline]
    pub fn set_life(&mut self, seconds: f32) {
        self.life = seconds;
        self.max_life = seconds;
    }

    pub(crate) fn deactivate(&mut self) {
        self.life = INACTIVE_LIFE;
    }

    /// Clamp a freshly initialised particle into a valid active state.
    pub(crate) fn sanitize_spawned(&mut self) {
        if !(self.life > 0.0) || !self.life.is_finite() {
            self.life = MIN_LIFE;
        }
        if !(self.max_life >= self.life) {
            self.max_life = self.life;
        }
        if !self.brightness.is_finite() {
            self.brightness = 1.0;
        }
        if !self.size.is_finite() || self.size < 0.0 {
            self.size = 0.0;
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        Particle::INACTIVE
    }
}
