//! A pool, its emission policy and its mesh batcher, stepped as one unit.
//!
//! Within a frame the three stages always run in the same order:
//!
//! 1. [`advance`](ParticleSystem::advance) ages and moves live particles,
//! 2. [`emit`](ParticleSystem::emit) fills free slots,
//! 3. [`rebuild`](ParticleSystem::rebuild) turns the survivors into a mesh.
//!
//! Effects that apply their own forces or terminal events do so between
//! stages through [`pool_mut`](ParticleSystem::pool_mut).

use log::trace;

use crate::emission::{Emission, EmissionPolicy};
use crate::mesh::{BatchMesh, MeshBatcher, QuadStyle, ViewBasis};
use crate::particle::Particle;
use crate::pool::ParticlePool;

/// What happened during one [`ParticleSystem::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Particles whose life ran out this frame.
    pub expired: usize,
    /// Particles spawned this frame.
    pub spawned: u32,
    /// Spawn requests dropped because the pool was full.
    pub dropped: u32,
    /// Active particles after the frame.
    pub active: usize,
}

/// Result of one [`ParticleSystem::emit`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitStats {
    pub spawned: u32,
    pub dropped: u32,
}

/// Pool, emission and batcher of one effect.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    name: &'static str,
    pool: ParticlePool,
    emission: EmissionPolicy,
    batcher: MeshBatcher,
}

impl ParticleSystem {
    /// Allocate a system with `capacity` slots.
    pub fn new(name: &'static str, capacity: usize, emission: Emission, style: QuadStyle) -> Self {
        Self {
            name,
            pool: ParticlePool::with_capacity(capacity),
            emission: EmissionPolicy::new(emission),
            batcher: MeshBatcher::with_capacity(style, capacity),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    #[inline]
    pub fn pool_mut(&mut self) -> &mut ParticlePool {
        &mut self.pool
    }

    #[inline]
    pub fn emission_mut(&mut self) -> &mut EmissionPolicy {
        &mut self.emission
    }

    #[inline]
    pub fn batcher(&self) -> &MeshBatcher {
        &self.batcher
    }

    /// Stage 1: age and move every live particle. Returns the expired count.
    pub fn advance(&mut self, dt: f32) -> usize {
        self.pool.advance(dt)
    }

    /// Stage 2: spawn as many particles as the emission policy asks for.
    ///
    /// `init` runs once per spawned particle. Requests beyond capacity are
    /// dropped silently.
    pub fn emit<F>(&mut self, signal: f32, dt: f32, init: F) -> EmitStats
    where
        F: FnMut(&mut Particle),
    {
        let requested = self.emission.spawn_count(signal, dt);
        self.spawn_many(requested, init)
    }

    /// Spawn exactly `count` particles outside the emission schedule.
    pub fn spawn_many<F>(&mut self, count: u32, mut init: F) -> EmitStats
    where
        F: FnMut(&mut Particle),
    {
        let mut spawned = 0;
        while spawned < count && self.pool.spawn(&mut init) {
            spawned += 1;
        }
        let dropped = count - spawned;
        if dropped > 0 {
            trace!("{}: pool full, dropped {} spawn(s)", self.name, dropped);
        }
        EmitStats { spawned, dropped }
    }

    /// Stage 3: rebuild the batch mesh. `None` means nothing to draw.
    pub fn rebuild(&mut self, view: &ViewBasis) -> Option<&BatchMesh> {
        self.batcher.rebuild(&self.pool, view)
    }

    /// Run all three stages in order.
    pub fn step<F>(&mut self, dt: f32, signal: f32, view: &ViewBasis, init: F) -> StepStats
    where
        F: FnMut(&mut Particle),
    {
        let expired = self.advance(dt);
        let emitted = self.emit(signal, dt, init);
        self.rebuild(view);
        StepStats {
            expired,
            spawned: emitted.spawned,
            dropped: emitted.dropped,
            active: self.pool.active_count(),
        }
    }

    /// Mesh from the last rebuild.
    pub fn mesh(&self) -> Option<&BatchMesh> {
        self.batcher.mesh()
    }

    /// Kill every particle and forget carried emission credit.
    pub fn reset(&mut self) {
        self.pool.clear();
        self.emission.reset();
    }
}
