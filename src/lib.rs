//! # warchief-fx - pooled, batched particle effects
//!
//! Client-side particle effects for an isometric action game: wind, comet
//! tails, meteor showers, dust devils and mana sparkles.
//!
//! Every effect is a fixed-size pool of particles advanced once per frame and
//! rebuilt into one interleaved vertex/index buffer, so each effect costs a
//! single draw call and never allocates after construction.
//!
//! ## Quick Start
//!
//! ```ignore
//! use warchief_fx::prelude::*;
//!
//! let config = EffectsConfig::load("effects.json")?;
//! let mut effects = EffectSet::new(&config);
//! let view = ViewBasis::isometric();
//!
//! // In your frame callback:
//! effects.meteors_mut().set_intensity(1.0);
//! effects.update(raw_delta_seconds, &view);
//! for (name, mesh) in effects.meshes() {
//!     upload_and_draw(name, &mesh.vertices, &mesh.indices);
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Pool
//!
//! A [`ParticlePool`] is allocated once. A slot is active while its `life` is
//! positive; inactive slots keep the sentinel life `-1.0` and are reused by
//! [`ParticlePool::spawn`]. Spawns into a full pool are dropped.
//!
//! ### Emission
//!
//! An [`EmissionPolicy`] turns a rate (fixed, or scaled by a `[0, 1]` signal)
//! into whole spawns per frame, carrying the fractional remainder forward so
//! low rates still emit on average.
//!
//! ### Batching
//!
//! A [`MeshBatcher`] writes four vertices and six indices per live particle.
//! Quads face the camera, stretch along velocity or lie flat on the ground
//! depending on the [`QuadShape`].
//!
//! ### Frame order
//!
//! A [`ParticleSystem`] runs `advance → emit → rebuild` every frame, so a
//! particle spawned this frame is drawn at its spawn position.
//!
//! ## Features
//!
//! | Feature | Default | Adds |
//! |---------|---------|------|
//! | `gpu` | yes | `gpu::GpuBatch` and `Vertex::layout()` for wgpu |

pub mod config;
pub mod effects;
pub mod emission;
mod error;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod mesh;
pub mod particle;
pub mod pool;
pub mod spawn;
pub mod system;
pub mod time;

pub use bytemuck;
pub use config::{EffectsConfig, FloatRange, FrameConfig};
pub use effects::{CometTail, DustDevil, Effect, EffectSet, ManaSparkle, MeteorShower, Wind};
pub use emission::{Emission, EmissionPolicy, EmissionState};
pub use error::ConfigError;
pub use glam::Vec3;
#[cfg(feature = "gpu")]
pub use gpu::GpuBatch;
pub use mesh::{BatchMesh, Fade, MeshBatcher, Palette, QuadShape, QuadStyle, SizeOverLife, Vertex, ViewBasis};
pub use particle::{Layer, Particle};
pub use pool::{ParticlePool, SlotSearch};
pub use spawn::SpawnRng;
pub use system::{ParticleSystem, StepStats};
pub use time::FrameClock;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use warchief_fx::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::EffectsConfig;
    pub use crate::effects::{CometTail, DustDevil, Effect, EffectSet, ManaSparkle, MeteorShower, Wind};
    pub use crate::emission::Emission;
    #[cfg(feature = "gpu")]
    pub use crate::gpu::GpuBatch;
    pub use crate::mesh::{BatchMesh, QuadShape, QuadStyle, Vertex, ViewBasis};
    pub use crate::particle::{Layer, Particle};
    pub use crate::pool::ParticlePool;
    pub use crate::system::ParticleSystem;
    pub use crate::time::FrameClock;
    pub use glam::Vec3;
}
