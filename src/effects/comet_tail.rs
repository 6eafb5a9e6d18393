//! Comet head with a drifting gas tail and a scatter of embers.
//!
//! The head itself is a single [`Layer::Core`] particle pinned to the comet
//! position. Tail and ember particles spawn along the segment the head
//! travelled since the last frame and drift backwards inside a cone around
//! the reverse travel direction, so fast comets leave a continuous tail.
//!
//! The default config is seeded: the same head path produces the same tail.

use glam::Vec3;
use log::debug;

use super::Effect;
use crate::config::CometTailConfig;
use crate::emission::Emission;
use crate::mesh::{BatchMesh, Fade, Palette, QuadShape, QuadStyle, SizeOverLife, ViewBasis};
use crate::particle::{Layer, Particle};
use crate::spawn::SpawnRng;
use crate::system::{ParticleSystem, StepStats};

/// Life the head is refreshed to every frame.
const HEAD_LIFE: f32 = 1.0;
/// Fraction of drift velocity lost per second.
const DRAG: f32 = 0.35;
/// Relative size gained per second by tail gas.
const TAIL_GROWTH: f32 = 0.6;
/// Head moves longer than this in one frame are treated as a teleport.
const MAX_SEGMENT: f32 = 10.0;

pub struct CometTail {
    config: CometTailConfig,
    system: ParticleSystem,
    rng: SpawnRng,
    head: Vec3,
    last_head: Option<Vec3>,
    travel: Vec3,
    emitting: bool,
}

impl CometTail {
    pub fn new(config: &CometTailConfig) -> Self {
        let style = QuadStyle {
            shape: QuadShape::Billboard,
            fade: Fade::Linear,
            size_over_life: SizeOverLife::Constant,
            palette: Palette::new()
                .with(Layer::Core, config.head_color)
                .with(Layer::Tail, config.tail_color)
                .with(Layer::Ember, config.ember_color),
        };
        let system = ParticleSystem::new(
            "comet_tail",
            config.capacity,
            Emission::Scaled {
                max_rate: config.rate,
            },
            style,
        );
        let rng = SpawnRng::from_seed(config.seed);
        debug!(
            "comet_tail: capacity {}, rate {}/s, seed {:?}",
            config.capacity, config.rate, config.seed
        );
        Self {
            config: config.clone(),
            system,
            rng,
            head: Vec3::ZERO,
            last_head: None,
            travel: Vec3::X,
            emitting: true,
        }
    }

    /// Move the comet head. Non-finite positions are ignored.
    pub fn set_head(&mut self, position: Vec3) {
        if position.is_finite() {
            self.head = position;
        }
    }

    #[inline]
    pub fn head(&self) -> Vec3 {
        self.head
    }

    /// Direction the comet is travelling in. A zero direction is ignored.
    pub fn set_travel_direction(&mut self, direction: Vec3) {
        if let Some(direction) = direction.try_normalize() {
            self.travel = direction;
        }
    }

    /// Turn the comet on or off. Existing tail particles fade out naturally.
    pub fn set_emitting(&mut self, emitting: bool) {
        self.emitting = emitting;
    }

    #[inline]
    pub fn is_emitting(&self) -> bool {
        self.emitting
    }

    fn init_head(p: &mut Particle, head: Vec3, size: f32) {
        p.position = head;
        p.set_life(HEAD_LIFE);
        p.layer = Layer::Core;
        p.size = size * 1.5;
        p.brightness = 1.5;
    }
}

impl Effect for CometTail {
    fn name(&self) -> &'static str {
        self.system.name()
    }

    fn update(&mut self, dt: f32, view: &ViewBasis) -> StepStats {
        let Self {
            config,
            system,
            rng,
            head,
            last_head,
            travel,
            emitting,
        } = self;
        let dt = dt.max(0.0);
        let head_pos = *head;
        let damping = (1.0 - DRAG * dt).max(0.0);
        let growth = 1.0 + TAIL_GROWTH * dt;

        let mut retired = 0;
        if !*emitting {
            retired = system.pool_mut().retire_where(|p| p.layer == Layer::Core);
        }
        system.pool_mut().for_each_active_mut(|p| match p.layer {
            Layer::Core => {
                p.position = head_pos;
                p.life = p.max_life;
            }
            Layer::Tail => {
                p.velocity *= damping;
                p.size *= growth;
            }
            _ => p.velocity *= damping,
        });

        let expired = system.advance(dt) + retired;

        let mut spawned = 0;
        let mut dropped = 0;
        if *emitting && !system.pool().iter_active().any(|p| p.layer == Layer::Core) {
            let size = config.size;
            let stats = system.spawn_many(1, |p| Self::init_head(p, head_pos, size));
            spawned += stats.spawned;
            dropped += stats.dropped;
        }

        // Nothing to fill in on the first frame or after a teleport.
        let from = (*last_head)
            .filter(|last| last.distance(head_pos) <= MAX_SEGMENT)
            .unwrap_or(head_pos);
        let back = -*travel;
        let signal = if *emitting { 1.0 } else { 0.0 };
        let stats = system.emit(signal, dt, |p| {
            let ember = rng.chance(config.ember_chance);
            let along = from.lerp(head_pos, rng.random());
            let radius = config.head_radius * rng.random();
            let jitter = rng.random_on_sphere(radius);
            let drift = rng.random_in_cone(back, config.spread);
            p.position = along + jitter;
            if ember {
                p.velocity = drift * config.drift_speed * rng.random_range(0.5, 1.0);
                p.set_life(config.ember_life.sample(rng));
                p.layer = Layer::Ember;
                p.size = config.ember_size;
                p.brightness = 1.2;
            } else {
                p.velocity = drift * config.drift_speed * rng.random_range(0.8, 1.2);
                p.set_life(config.life.sample(rng));
                p.layer = Layer::Tail;
                p.size = config.size;
                p.brightness = rng.random_range(0.8, 1.0);
            }
        });
        spawned += stats.spawned;
        dropped += stats.dropped;
        *last_head = Some(head_pos);

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
        self.last_head = None;
    }
}
