//! Per-effect tunables.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{FloatRange, Sanitizer};

/// Wind streaks blowing across the play area.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindConfig {
    pub capacity: usize,
    /// Streaks per second at full intensity.
    pub max_rate: f32,
    pub life: FloatRange,
    /// Direction the wind blows towards.
    pub direction: Vec3,
    /// Base streak speed in units per second.
    pub speed: f32,
    /// Relative speed variation, `0.3` = ±30 %.
    pub speed_jitter: f32,
    /// Vertical wobble speed amplitude.
    pub lift: f32,
    /// Half-extents of the spawn box around the anchor.
    pub area: Vec3,
    /// Streak half-width.
    pub size: f32,
    /// Streak length per unit of speed.
    pub stretch: f32,
    pub color: [f32; 4],
    pub seed: Option<u64>,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            max_rate: 80.0,
            life: FloatRange::new(1.0, 2.0),
            direction: Vec3::new(1.0, 0.0, 0.3),
            speed: 6.0,
            speed_jitter: 0.3,
            lift: 0.4,
            area: Vec3::new(12.0, 3.0, 12.0),
            size: 0.03,
            stretch: 0.12,
            color: [0.85, 0.9, 1.0, 0.35],
            seed: None,
        }
    }
}

impl WindConfig {
    pub(crate) fn sanitize(&mut self, s: &mut Sanitizer) {
        s.capacity("capacity", &mut self.capacity);
        s.non_negative("max_rate", &mut self.max_rate);
        s.range("life", &mut self.life);
        s.direction("direction", &mut self.direction, Self::default().direction);
        s.non_negative("speed", &mut self.speed);
        s.fraction("speed_jitter", &mut self.speed_jitter);
        s.non_negative("lift", &mut self.lift);
        s.finite("area", &mut self.area);
        self.area = self.area.abs();
        s.non_negative("size", &mut self.size);
        s.non_negative("stretch", &mut self.stretch);
        s.color("color", &mut self.color);
    }
}

/// Glowing tail left behind a comet head.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CometTailConfig {
    pub capacity: usize,
    /// Tail particles per second.
    pub rate: f32,
    /// Probability that a spawned particle is an ember instead of tail.
    pub ember_chance: f32,
    pub life: FloatRange,
    pub ember_life: FloatRange,
    /// Speed at which tail particles drift away from the head.
    pub drift_speed: f32,
    /// Cone half-angle of the drift, radians.
    pub spread: f32,
    /// Radius of the spawn sphere around the head.
    pub head_radius: f32,
    pub size: f32,
    pub ember_size: f32,
    pub head_color: [f32; 4],
    pub tail_color: [f32; 4],
    pub ember_color: [f32; 4],
    pub seed: Option<u64>,
}

impl Default for CometTailConfig {
    fn default() -> Self {
        Self {
            capacity: 512,
            rate: 90.0,
            ember_chance: 0.15,
            life: FloatRange::new(1.5, 3.0),
            ember_life: FloatRange::new(3.0, 5.0),
            drift_speed: 1.5,
            spread: 0.35,
            head_radius: 0.3,
            size: 0.35,
            ember_size: 0.08,
            head_color: [1.0, 1.0, 0.95, 1.0],
            tail_color: [0.55, 0.8, 1.0, 0.6],
            ember_color: [1.0, 0.75, 0.4, 0.9],
            seed: Some(1337),
        }
    }
}

impl CometTailConfig {
    pub(crate) fn sanitize(&mut self, s: &mut Sanitizer) {
        s.capacity("capacity", &mut self.capacity);
        s.non_negative("rate", &mut self.rate);
        s.fraction("ember_chance", &mut self.ember_chance);
        s.range("life", &mut self.life);
        s.range("ember_life", &mut self.ember_life);
        s.non_negative("drift_speed", &mut self.drift_speed);
        s.non_negative("spread", &mut self.spread);
        s.non_negative("head_radius", &mut self.head_radius);
        s.non_negative("size", &mut self.size);
        s.non_negative("ember_size", &mut self.ember_size);
        s.color("head_color", &mut self.head_color);
        s.color("tail_color", &mut self.tail_color);
        s.color("ember_color", &mut self.ember_color);
    }
}

/// Meteors falling onto a target area and shattering on impact.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeteorConfig {
    /// Shared by meteors and their debris.
    pub capacity: usize,
    /// Meteors per second at full intensity.
    pub max_rate: f32,
    /// Radius of the impact area around the target.
    pub area_radius: f32,
    /// Height above ground at which meteors appear.
    pub spawn_height: f32,
    /// Direction of fall; normalised on use.
    pub fall_direction: Vec3,
    pub speed: FloatRange,
    pub meteor_size: f32,
    pub stretch: f32,
    /// Debris fragments per impact.
    pub debris_count: u32,
    pub debris_speed: FloatRange,
    pub debris_life: FloatRange,
    pub debris_size: f32,
    pub gravity: f32,
    pub ground_height: f32,
    pub core_color: [f32; 4],
    pub debris_color: [f32; 4],
    pub seed: Option<u64>,
}

impl Default for MeteorConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            max_rate: 0.8,
            area_radius: 20.0,
            spawn_height: 40.0,
            fall_direction: Vec3::new(0.4, -1.0, 0.2),
            speed: FloatRange::new(25.0, 40.0),
            meteor_size: 0.25,
            stretch: 0.06,
            debris_count: 10,
            debris_speed: FloatRange::new(3.0, 7.0),
            debris_life: FloatRange::new(0.4, 1.0),
            debris_size: 0.06,
            gravity: 9.8,
            ground_height: 0.0,
            core_color: [1.0, 0.6, 0.25, 1.0],
            debris_color: [0.9, 0.35, 0.1, 0.9],
            seed: None,
        }
    }
}

impl MeteorConfig {
    pub(crate) fn sanitize(&mut self, s: &mut Sanitizer) {
        s.capacity("capacity", &mut self.capacity);
        s.non_negative("max_rate", &mut self.max_rate);
        s.non_negative("area_radius", &mut self.area_radius);
        s.non_negative("spawn_height", &mut self.spawn_height);
        s.direction("fall_direction", &mut self.fall_direction, Self::default().fall_direction);
        if self.fall_direction.y >= 0.0 {
            // Meteors that never descend would never hit the ground.
            let fallback = Self::default().fall_direction;
            s.report("fall_direction", self.fall_direction, fallback);
            self.fall_direction = fallback;
        }
        s.range("speed", &mut self.speed);
        s.non_negative("meteor_size", &mut self.meteor_size);
        s.non_negative("stretch", &mut self.stretch);
        s.range("debris_speed", &mut self.debris_speed);
        s.range("debris_life", &mut self.debris_life);
        s.non_negative("debris_size", &mut self.debris_size);
        s.non_negative("gravity", &mut self.gravity);
        if !self.ground_height.is_finite() {
            s.report("ground_height", self.ground_height, 0.0f32);
            self.ground_height = 0.0;
        }
        s.color("core_color", &mut self.core_color);
        s.color("debris_color", &mut self.debris_color);
    }
}

/// Swirling column of dust travelling with an anchor.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DustDevilConfig {
    pub capacity: usize,
    /// Particles per second at full intensity.
    pub max_rate: f32,
    /// Radius of the column at the ground.
    pub radius: f32,
    /// Radius gained per unit of height.
    pub flare: f32,
    /// Angular speed of the swirl, radians per second.
    pub angular_speed: f32,
    pub rise_speed: FloatRange,
    pub life: FloatRange,
    pub size: f32,
    /// Probability that a particle is a ground-hugging debris decal.
    pub debris_chance: f32,
    pub dust_color: [f32; 4],
    pub debris_color: [f32; 4],
    pub seed: Option<u64>,
}

impl Default for DustDevilConfig {
    fn default() -> Self {
        Self {
            capacity: 384,
            max_rate: 120.0,
            radius: 0.6,
            flare: 0.35,
            angular_speed: 3.0,
            rise_speed: FloatRange::new(1.0, 2.2),
            life: FloatRange::new(1.5, 3.0),
            size: 0.12,
            debris_chance: 0.2,
            dust_color: [0.78, 0.66, 0.48, 0.55],
            debris_color: [0.45, 0.36, 0.25, 0.8],
            seed: None,
        }
    }
}

impl DustDevilConfig {
    pub(crate) fn sanitize(&mut self, s: &mut Sanitizer) {
        s.capacity("capacity", &mut self.capacity);
        s.non_negative("max_rate", &mut self.max_rate);
        s.non_negative("radius", &mut self.radius);
        s.non_negative("flare", &mut self.flare);
        if !self.angular_speed.is_finite() {
            s.report("angular_speed", self.angular_speed, 0.0f32);
            self.angular_speed = 0.0;
        }
        s.range("rise_speed", &mut self.rise_speed);
        s.range("life", &mut self.life);
        s.non_negative("size", &mut self.size);
        s.fraction("debris_chance", &mut self.debris_chance);
        s.color("dust_color", &mut self.dust_color);
        s.color("debris_color", &mut self.debris_color);
    }
}

/// Twinkling sparkles around a caster, scaled by its mana.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ManaSparkleConfig {
    pub capacity: usize,
    /// Sparkles per second at full mana.
    pub max_rate: f32,
    /// Radius of the spawn disk around the anchor.
    pub radius: f32,
    /// Height range above the anchor.
    pub height: FloatRange,
    pub rise_speed: f32,
    pub life: FloatRange,
    pub size: f32,
    /// Twinkle frequency, radians per second.
    pub twinkle_rate: f32,
    /// Probability that a sparkle is a larger, dimmer glow.
    pub glow_chance: f32,
    pub sparkle_color: [f32; 4],
    pub glow_color: [f32; 4],
    pub seed: Option<u64>,
}

impl Default for ManaSparkleConfig {
    fn default() -> Self {
        Self {
            capacity: 128,
            max_rate: 40.0,
            radius: 1.2,
            height: FloatRange::new(0.2, 2.0),
            rise_speed: 0.6,
            life: FloatRange::new(0.6, 1.4),
            size: 0.06,
            twinkle_rate: 12.0,
            glow_chance: 0.2,
            sparkle_color: [0.6, 0.8, 1.0, 1.0],
            glow_color: [0.3, 0.45, 1.0, 0.5],
            seed: None,
        }
    }
}

impl ManaSparkleConfig {
    pub(crate) fn sanitize(&mut self, s: &mut Sanitizer) {
        s.capacity("capacity", &mut self.capacity);
        s.non_negative("max_rate", &mut self.max_rate);
        s.non_negative("radius", &mut self.radius);
        s.range("height", &mut self.height);
        s.non_negative("rise_speed", &mut self.rise_speed);
        s.range("life", &mut self.life);
        s.non_negative("size", &mut self.size);
        s.non_negative("twinkle_rate", &mut self.twinkle_rate);
        s.fraction("glow_chance", &mut self.glow_chance);
        s.color("sparkle_color", &mut self.sparkle_color);
        s.color("glow_color", &mut self.glow_color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_need_no_fixes() {
        let mut s = Sanitizer::new("defaults");
        WindConfig::default().sanitize(&mut s);
        CometTailConfig::default().sanitize(&mut s);
        MeteorConfig::default().sanitize(&mut s);
        DustDevilConfig::default().sanitize(&mut s);
        ManaSparkleConfig::default().sanitize(&mut s);
        assert_eq!(s.fixes(), 0);
    }

    #[test]
    fn test_upward_meteors_are_corrected() {
        let mut config = MeteorConfig {
            fall_direction: Vec3::new(0.0, 1.0, 0.0),
            ..MeteorConfig::default()
        };
        let mut s = Sanitizer::new("meteors");
        config.sanitize(&mut s);
        assert!(config.fall_direction.y < 0.0);
        assert_eq!(s.fixes(), 1);
    }

    #[test]
    fn test_comet_tail_is_seeded_by_default() {
        assert!(CometTailConfig::default().seed.is_some());
        assert!(MeteorConfig::default().seed.is_none());
    }
}
