//! Configuration for the particle effects.
//!
//! An [`EffectsConfig`] is built once at startup (from defaults or a JSON
//! file) and passed by reference into each effect's constructor. Effects copy
//! what they need; nothing reads configuration through global state.
//!
//! Every field has a default and every section is `#[serde(default)]`, so a
//! JSON file only needs the values it overrides:
//!
//! ```json
//! { "wind": { "max_rate": 150.0 }, "meteors": { "seed": 7 } }
//! ```

mod effects;

use glam::Vec3;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::spawn::SpawnRng;

pub use effects::{CometTailConfig, DustDevilConfig, ManaSparkleConfig, MeteorConfig, WindConfig};

/// Largest pool an effect may ask for.
pub const MAX_CAPACITY: usize = 1 << 16;

/// Inclusive-exclusive `[min, max)` range of a tunable.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Random value in the range; `min` for an empty range.
    pub fn sample(&self, rng: &mut SpawnRng) -> f32 {
        rng.random_range(self.min, self.max)
    }

    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) * 0.5
    }
}

/// Frame timing settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FrameConfig {
    /// Largest delta time an update may simulate, in seconds.
    pub max_delta: f32,
    /// Simulation speed multiplier (1.0 = normal).
    pub time_scale: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_delta: 0.1,
            time_scale: 1.0,
        }
    }
}

/// Complete effects configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectsConfig {
    pub frame: FrameConfig,
    pub wind: WindConfig,
    pub comet_tail: CometTailConfig,
    pub meteors: MeteorConfig,
    pub dust_devil: DustDevilConfig,
    pub mana_sparkle: ManaSparkleConfig,
}

impl EffectsConfig {
    /// Parse a config from JSON text and sanitise it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Serialise to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| ConfigError::io(path, e))
    }

    /// Clamp every out-of-range value into its valid range.
    ///
    /// Each correction is logged at warn level.
    pub fn sanitized(mut self) -> Self {
        let mut frame = Sanitizer::new("frame");
        frame.non_negative("max_delta", &mut self.frame.max_delta);
        frame.non_negative("time_scale", &mut self.frame.time_scale);

        let mut wind = Sanitizer::new("wind");
        self.wind.sanitize(&mut wind);
        let mut comet_tail = Sanitizer::new("comet_tail");
        self.comet_tail.sanitize(&mut comet_tail);
        let mut meteors = Sanitizer::new("meteors");
        self.meteors.sanitize(&mut meteors);
        let mut dust_devil = Sanitizer::new("dust_devil");
        self.dust_devil.sanitize(&mut dust_devil);
        let mut mana_sparkle = Sanitizer::new("mana_sparkle");
        self.mana_sparkle.sanitize(&mut mana_sparkle);

        let fixes = [frame, wind, comet_tail, meteors, dust_devil, mana_sparkle]
            .iter()
            .map(Sanitizer::fixes)
            .sum::<usize>();
        if fixes > 0 {
            debug!("effects config: {} value(s) clamped", fixes);
        }
        self
    }
}

/// Clamps config fields in place and reports what it changed.
pub(crate) struct Sanitizer {
    section: &'static str,
    fixes: usize,
}

impl Sanitizer {
    pub(crate) fn new(section: &'static str) -> Self {
        Self { section, fixes: 0 }
    }

    pub(crate) fn fixes(&self) -> usize {
        self.fixes
    }

    pub(crate) fn report(&mut self, field: &str, old: impl std::fmt::Debug, new: impl std::fmt::Debug) {
        warn!("{}.{}: {:?} out of range, using {:?}", self.section, field, old, new);
        self.fixes += 1;
    }

    pub(crate) fn non_negative(&mut self, field: &str, value: &mut f32) {
        if !(value.is_finite() && *value >= 0.0) {
            self.report(field, *value, 0.0f32);
            *value = 0.0;
        }
    }

    pub(crate) fn fraction(&mut self, field: &str, value: &mut f32) {
        let new = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
        if new != *value {
            self.report(field, *value, new);
            *value = new;
        }
    }

    pub(crate) fn capacity(&mut self, field: &str, value: &mut usize) {
        let new = (*value).clamp(1, MAX_CAPACITY);
        if new != *value {
            self.report(field, *value, new);
            *value = new;
        }
    }

    /// Both ends become finite and non-negative, and `max >= min`. A range
    /// counts as one fix however many ends were wrong.
    pub(crate) fn range(&mut self, field: &str, range: &mut FloatRange) {
        let old = *range;
        let end = |v: f32| if v.is_finite() && v >= 0.0 { v } else { 0.0 };
        let min = end(old.min);
        let new = FloatRange::new(min, end(old.max).max(min));
        if new != old {
            self.report(field, old, new);
            *range = new;
        }
    }

    /// Zero or non-finite directions are replaced by `fallback`.
    pub(crate) fn direction(&mut self, field: &str, value: &mut Vec3, fallback: Vec3) {
        if !value.is_finite() || value.length_squared() < 1.0e-8 {
            self.report(field, *value, fallback);
            *value = fallback;
        }
    }

    pub(crate) fn finite(&mut self, field: &str, value: &mut Vec3) {
        if !value.is_finite() {
            self.report(field, *value, Vec3::ZERO);
            *value = Vec3::ZERO;
        }
    }

    pub(crate) fn color(&mut self, field: &str, value: &mut [f32; 4]) {
        let new = value.map(|c| if c.is_finite() { c.max(0.0) } else { 0.0 });
        if new != *value {
            self.report(field, *value, new);
            *value = new;
        }
    }
}
