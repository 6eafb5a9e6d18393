//! The game's particle effects.
//!
//! Each effect owns one [`ParticleSystem`](crate::system::ParticleSystem) and
//! adds its own spawn and force rules on top. [`EffectSet`] builds all of them
//! from an [`EffectsConfig`] and drives them with one [`FrameClock`].
//!
//! ```ignore
//! let mut effects = EffectSet::new(&config);
//! effects.wind_mut().set_intensity(0.6);
//!
//! // Every frame:
//! effects.update(raw_dt, &view);
//! for (name, mesh) in effects.meshes() {
//!     renderer.draw(name, mesh);
//! }
//! ```

mod comet_tail;
mod dust_devil;
mod mana_sparkle;
mod meteor;
mod wind;

pub use comet_tail::CometTail;
pub use dust_devil::DustDevil;
pub use mana_sparkle::ManaSparkle;
pub use meteor::MeteorShower;
pub use wind::Wind;

use log::debug;

use crate::config::EffectsConfig;
use crate::mesh::{BatchMesh, ViewBasis};
use crate::system::StepStats;
use crate::time::FrameClock;

/// A particle effect updated once per frame.
pub trait Effect {
    /// Stable name, used in logs.
    fn name(&self) -> &'static str;

    /// Simulate `dt` seconds and rebuild the mesh for `view`.
    fn update(&mut self, dt: f32, view: &ViewBasis) -> StepStats;

    /// Mesh from the last update, `None` when nothing should be drawn.
    fn mesh(&self) -> Option<&BatchMesh>;

    fn active_count(&self) -> usize;

    /// Kill every particle.
    fn reset(&mut self);
}

/// Per-effect stats of one [`EffectSet::update`].
pub type FrameReport = [(&'static str, StepStats); EffectSet::LEN];

/// Every effect of the game, driven by one clock.
pub struct EffectSet {
    clock: FrameClock,
    wind: Wind,
    comet_tail: CometTail,
    meteors: MeteorShower,
    dust_devil: DustDevil,
    mana_sparkle: ManaSparkle,
}

impl EffectSet {
    /// Number of effects in the set.
    pub const LEN: usize = 5;

    /// Build every effect. Out-of-range config values are clamped first, the
    /// same way [`EffectsConfig::from_json`] clamps them.
    pub fn new(config: &EffectsConfig) -> Self {
        let config = config.clone().sanitized();
        let mut clock = FrameClock::new(config.frame.max_delta);
        clock.set_time_scale(config.frame.time_scale);
        let set = Self {
            clock,
            wind: Wind::new(&config.wind),
            comet_tail: CometTail::new(&config.comet_tail),
            meteors: MeteorShower::new(&config.meteors),
            dust_devil: DustDevil::new(&config.dust_devil),
            mana_sparkle: ManaSparkle::new(&config.mana_sparkle),
        };
        debug!(
            "effect set ready: {} effects, max delta {}s",
            Self::LEN,
            set.clock.max_delta()
        );
        set
    }

    /// Advance the clock by a raw frame delta and update every effect.
    pub fn update(&mut self, raw_dt: f32, view: &ViewBasis) -> FrameReport {
        let dt = self.clock.advance(raw_dt);
        self.effects_mut().map(|effect| (effect.name(), effect.update(dt, view)))
    }

    pub fn effects(&self) -> [&dyn Effect; Self::LEN] {
        [
            &self.wind,
            &self.comet_tail,
            &self.meteors,
            &self.dust_devil,
            &self.mana_sparkle,
        ]
    }

    pub fn effects_mut(&mut self) -> [&mut dyn Effect; Self::LEN] {
        [
            &mut self.wind,
            &mut self.comet_tail,
            &mut self.meteors,
            &mut self.dust_devil,
            &mut self.mana_sparkle,
        ]
    }

    /// Meshes that need drawing this frame, by effect name.
    pub fn meshes(&self) -> impl Iterator<Item = (&'static str, &BatchMesh)> + '_ {
        self.effects()
            .into_iter()
            .filter_map(|effect| effect.mesh().map(|mesh| (effect.name(), mesh)))
    }

    /// Active particles across all effects.
    pub fn active_count(&self) -> usize {
        self.effects().iter().map(|effect| effect.active_count()).sum()
    }

    /// Kill every particle and reset the clock.
    pub fn reset(&mut self) {
        for effect in self.effects_mut() {
            effect.reset();
        }
        self.clock.reset();
    }

    #[inline]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[inline]
    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    #[inline]
    pub fn wind_mut(&mut self) -> &mut Wind {
        &mut self.wind
    }

    #[inline]
    pub fn comet_tail_mut(&mut self) -> &mut CometTail {
        &mut self.comet_tail
    }

    #[inline]
    pub fn meteors_mut(&mut self) -> &mut MeteorShower {
        &mut self.meteors
    }

    #[inline]
    pub fn dust_devil_mut(&mut self) -> &mut DustDevil {
        &mut self.dust_devil
    }

    #[inline]
    pub fn mana_sparkle_mut(&mut self) -> &mut ManaSparkle {
        &mut self.mana_sparkle
    }
}
