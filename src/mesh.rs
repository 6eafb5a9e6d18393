//! Batch mesh building for particle effects.
//!
//! Every active particle becomes one quad (4 vertices, 2 triangles) in a single
//! shared vertex/index buffer, so an effect is drawn with one indexed draw call.
//!
//! # Quad layout
//!
//! Each quad is built from a centre `c` and two half-axes `u`, `v`:
//!
//! ```text
//!  3 (c-u+v) ---- 2 (c+u+v)
//!     |         / |
//!     |       /   |
//!     |     /     |
//!  0 (c-u-v) ---- 1 (c+u-v)
//! ```
//!
//! with indices `0, 1, 2, 0, 2, 3`. Every [`QuadShape`] picks `u` and `v` so
//! that `u × v` points at the camera (or up, for flat quads), which makes the
//! winding counter-clockwise from the viewer.
//!
//! # Colour
//!
//! `rgb = tint.rgb * brightness`, `alpha = tint.a * fade(life_fraction)`.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::particle::{Layer, Particle};
use crate::pool::ParticlePool;

/// Direction substituted for an undefined streak direction.
pub const FALLBACK_AXIS: Vec3 = Vec3::Y;

/// Index order of the two triangles of a quad.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Interleaved vertex: position followed by RGBA colour.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Camera orientation used to face quads towards the viewer.
///
/// `right × up` equals `-forward`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBasis {
    pub right: Vec3,
    pub up: Vec3,
    /// Direction the camera looks along.
    pub forward: Vec3,
}

impl ViewBasis {
    /// Build a basis from a viewing direction, with world +Y as the up hint.
    ///
    /// Looking straight up or down switches the hint to +X; a zero direction
    /// falls back to looking down -Z.
    pub fn from_forward(forward: Vec3) -> Self {
        let forward = forward.try_normalize().unwrap_or(Vec3::NEG_Z);
        let hint = if forward.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
        let right = forward.cross(hint).normalize();
        let up = right.cross(forward);
        Self { right, up, forward }
    }

    /// Classic isometric camera looking down the (-1, -1, -1) diagonal.
    pub fn isometric() -> Self {
        Self::from_forward(Vec3::new(-1.0, -1.0, -1.0))
    }
}

impl Default for ViewBasis {
    fn default() -> Self {
        Self::isometric()
    }
}

/// How a particle is turned into a quad.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum QuadShape {
    /// Square facing the camera.
    #[default]
    Billboard,
    /// Quad stretched along the velocity, facing the camera as far as the
    /// velocity allows. Length is `size + speed * stretch`.
    Streak { stretch: f32 },
    /// Square lying in the XZ plane, facing up.
    Flat,
}

/// Alpha as a function of remaining life.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Fade {
    /// Full alpha for the whole life.
    Constant,
    /// Alpha equals the remaining life fraction.
    #[default]
    Linear,
    /// Ramp in over the first `fade_in` of life, out over the last `fade_out`.
    InOut { fade_in: f32, fade_out: f32 },
}

impl Fade {
    /// Alpha multiplier for a particle with the given remaining life fraction.
    pub fn alpha(&self, life_fraction: f32) -> f32 {
        let life = life_fraction.clamp(0.0, 1.0);
        match *self {
            Fade::Constant => 1.0,
            Fade::Linear => life,
            Fade::InOut { fade_in, fade_out } => {
                let age = 1.0 - life;
                let ramp_in = if fade_in > 0.0 { (age / fade_in).min(1.0) } else { 1.0 };
                let ramp_out = if fade_out > 0.0 { (life / fade_out).min(1.0) } else { 1.0 };
                ramp_in.min(ramp_out)
            }
        }
    }
}

/// Quad size as a function of remaining life.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum SizeOverLife {
    #[default]
    Constant,
    /// Shrinks to zero at expiry.
    Shrink,
    /// Grows from `start` times the size to full size at expiry.
    Grow { start: f32 },
}

impl SizeOverLife {
    pub fn scale(&self, life_fraction: f32) -> f32 {
        let life = life_fraction.clamp(0.0, 1.0);
        match *self {
            SizeOverLife::Constant => 1.0,
            SizeOverLife::Shrink => life,
            SizeOverLife::Grow { start } => start + (1.0 - start) * (1.0 - life),
        }
    }
}

/// Per-layer RGBA tint table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    tints: [[f32; 4]; Layer::COUNT],
}

impl Palette {
    /// Every layer white and opaque.
    pub fn new() -> Self {
        Self {
            tints: [[1.0; 4]; Layer::COUNT],
        }
    }

    /// Set the tint of one layer.
    pub fn with(mut self, layer: Layer, tint: [f32; 4]) -> Self {
        self.set(layer, tint);
        self
    }

    pub fn set(&mut self, layer: Layer, tint: [f32; 4]) {
        self.tints[layer.index()] = tint;
    }

    #[inline]
    pub fn tint(&self, layer: Layer) -> [f32; 4] {
        self.tints[layer.index()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

/// Rendering rule of one effect: shape, fade, size curve and palette.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuadStyle {
    pub shape: QuadShape,
    pub fade: Fade,
    pub size_over_life: SizeOverLife,
    pub palette: Palette,
}

/// Vertex and index buffers of one effect for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl BatchMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quad_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
        }
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Append one quad with the fixed corner order.
    pub fn push_quad(&mut self, center: Vec3, u: Vec3, v: Vec3, color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        let corners = [center - u - v, center + u - v, center + u + v, center - u + v];
        self.vertices.extend(corners.iter().map(|c| Vertex {
            position: c.to_array(),
            color,
        }));
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }
}

/// Rebuilds the batch mesh of one effect from its pool.
#[derive(Debug, Clone, Default)]
pub struct MeshBatcher {
    style: QuadStyle,
    mesh: BatchMesh,
}

impl MeshBatcher {
    pub fn new(style: QuadStyle) -> Self {
        Self {
            style,
            mesh: BatchMesh::new(),
        }
    }

    /// Pre-size the buffers for a pool so rebuilding never reallocates.
    pub fn with_capacity(style: QuadStyle, particles: usize) -> Self {
        Self {
            style,
            mesh: BatchMesh::with_quad_capacity(particles),
        }
    }

    #[inline]
    pub fn style(&self) -> &QuadStyle {
        &self.style
    }

    #[inline]
    pub fn style_mut(&mut self) -> &mut QuadStyle {
        &mut self.style
    }

    /// Rebuild the mesh from every active particle.
    ///
    /// Returns `None` when no particle is active; the caller must not draw.
    pub fn rebuild(&mut self, pool: &ParticlePool, view: &ViewBasis) -> Option<&BatchMesh> {
        self.mesh.clear();
        for p in pool.iter_active() {
            let (u, v) = quad_axes(p, &self.style, view);
            let color = particle_color(p, &self.style);
            self.mesh.push_quad(p.position, u, v, color);
        }
        self.mesh()
    }

    /// Mesh from the last rebuild, `None` if it was empty.
    pub fn mesh(&self) -> Option<&BatchMesh> {
        if self.mesh.is_empty() {
            None
        } else {
            Some(&self.mesh)
        }
    }
}

/// Colour of a particle under a style.
pub fn particle_color(p: &Particle, style: &QuadStyle) -> [f32; 4] {
    let tint = style.palette.tint(p.layer);
    let brightness = p.brightness.max(0.0);
    let alpha = style.fade.alpha(p.life_fraction());
    [
        tint[0] * brightness,
        tint[1] * brightness,
        tint[2] * brightness,
        tint[3] * alpha,
    ]
}

/// Half-axes of a particle's quad under a style.
pub fn quad_axes(p: &Particle, style: &QuadStyle, view: &ViewBasis) -> (Vec3, Vec3) {
    let half = p.size.max(0.0) * style.size_over_life.scale(p.life_fraction());
    match style.shape {
        QuadShape::Billboard => (view.right * half, view.up * half),
        QuadShape::Flat => (Vec3::Z * half, Vec3::X * half),
        QuadShape::Streak { stretch } => {
            let speed = p.velocity.length();
            let dir = streak_direction(p.velocity);
            let side = perpendicular(dir, view.forward);
            let length = half + if speed.is_finite() { speed * stretch.max(0.0) } else { 0.0 };
            (side * half, dir * length)
        }
    }
}

/// Unit direction of a velocity, or [`FALLBACK_AXIS`] when undefined.
pub fn streak_direction(velocity: Vec3) -> Vec3 {
    velocity.try_normalize().unwrap_or(FALLBACK_AXIS)
}

/// Unit vector perpendicular to `dir`, chosen so the quad faces along
/// `-forward`.
///
/// When `dir` is parallel to `forward` the cross product vanishes; the fixed
/// X axis (or Z, if `dir` is along X) is used instead.
pub fn perpendicular(dir: Vec3, forward: Vec3) -> Vec3 {
    if let Some(side) = forward.cross(dir).try_normalize() {
        return side;
    }
    let fallback = if dir.x.abs() > 0.9 { Vec3::Z } else { Vec3::X };
    fallback
        .cross(dir)
        .cross(dir)
        .try_normalize()
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(velocity: Vec3) -> Particle {
        let mut p = Particle::INACTIVE;
        p.set_life(1.0);
        p.velocity = velocity;
        p.size = 0.5;
        p
    }

    fn assert_finite(mesh: &BatchMesh) {
        for v in &mesh.vertices {
            assert!(v.position.iter().all(|c| c.is_finite()), "{:?}", v);
            assert!(v.color.iter().all(|c| c.is_finite()), "{:?}", v);
        }
    }

    /// Normal of the first triangle of quad `q`.
    fn quad_normal(mesh: &BatchMesh, q: usize) -> Vec3 {
        let p = |i: usize| Vec3::from_array(mesh.vertices[mesh.indices[q * 6 + i] as usize].position);
        (p(1) - p(0)).cross(p(2) - p(0))
    }

    #[test]
    fn test_view_basis_is_orthonormal() {
        for forward in [Vec3::new(-1.0, -1.0, -1.0), Vec3::NEG_Y, Vec3::Y, Vec3::ZERO] {
            let view = ViewBasis::from_forward(forward);
            assert!((view.right.length() - 1.0).abs() < 1e-5);
            assert!((view.up.length() - 1.0).abs() < 1e-5);
            assert!(view.right.dot(view.up).abs() < 1e-5);
            assert!((view.right.cross(view.up) + view.forward).length() < 1e-5);
        }
    }

    #[test]
    fn test_empty_pool_yields_none() {
        let pool = ParticlePool::with_capacity(8);
        let mut batcher = MeshBatcher::new(QuadStyle::default());
        assert!(batcher.rebuild(&pool, &ViewBasis::default()).is_none());
        assert!(batcher.mesh().is_none());
    }

    #[test]
    fn test_one_quad_per_active_particle() {
        let mut pool = ParticlePool::with_capacity(8);
        for _ in 0..3 {
            pool.spawn(|p| p.set_life(1.0));
        }
        let mut batcher = MeshBatcher::new(QuadStyle::default());
        let mesh = batcher.rebuild(&pool, &ViewBasis::default()).unwrap();
        assert_eq!(mesh.quad_count(), 3);
        assert_eq!(mesh.vertices.len(), 12);
        assert_eq!(mesh.indices.len(), 18);
        assert_eq!(&mesh.indices[6..12], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_billboard_faces_camera() {
        let view = ViewBasis::isometric();
        let mut mesh = BatchMesh::new();
        let style = QuadStyle::default();
        let p = particle(Vec3::ZERO);
        let (u, v) = quad_axes(&p, &style, &view);
        mesh.push_quad(p.position, u, v, [1.0; 4]);
        assert!(quad_normal(&mesh, 0).dot(view.forward) < 0.0);
    }

    #[test]
    fn test_streak_faces_camera_and_follows_velocity() {
        let view = ViewBasis::isometric();
        let style = QuadStyle {
            shape: QuadShape::Streak { stretch: 0.1 },
            ..QuadStyle::default()
        };
        let p = particle(Vec3::new(4.0, 0.0, 0.0));
        let (u, v) = quad_axes(&p, &style, &view);
        assert!(v.normalize().dot(Vec3::X) > 0.999);
        assert!((v.length() - (0.5 + 0.4)).abs() < 1e-5);
        let mut mesh = BatchMesh::new();
        mesh.push_quad(p.position, u, v, [1.0; 4]);
        assert!(quad_normal(&mesh, 0).dot(view.forward) < 0.0);
    }

    #[test]
    fn test_zero_velocity_streak_is_finite() {
        let mut pool = ParticlePool::with_capacity(1);
        pool.spawn(|p| {
            p.set_life(1.0);
            p.size = 0.2;
        });
        let mut batcher = MeshBatcher::new(QuadStyle {
            shape: QuadShape::Streak { stretch: 1.0 },
            ..QuadStyle::default()
        });
        let mesh = batcher.rebuild(&pool, &ViewBasis::default()).unwrap();
        assert_finite(mesh);
        assert!(quad_normal(mesh, 0).length() > 0.0);
    }

    #[test]
    fn test_velocity_parallel_to_view_is_finite() {
        let view = ViewBasis::from_forward(Vec3::NEG_Y);
        let style = QuadStyle {
            shape: QuadShape::Streak { stretch: 1.0 },
            ..QuadStyle::default()
        };
        let p = particle(Vec3::new(0.0, -3.0, 0.0));
        let (u, v) = quad_axes(&p, &style, &view);
        assert!(u.is_finite() && v.is_finite());
        assert!(u.length() > 0.0);
        assert!(u.dot(v).abs() < 1e-5);
    }

    #[test]
    fn test_flat_faces_up() {
        let mut mesh = BatchMesh::new();
        let style = QuadStyle {
            shape: QuadShape::Flat,
            ..QuadStyle::default()
        };
        let p = particle(Vec3::ZERO);
        let (u, v) = quad_axes(&p, &style, &ViewBasis::default());
        mesh.push_quad(p.position, u, v, [1.0; 4]);
        assert!(quad_normal(&mesh, 0).y > 0.0);
    }

    #[test]
    fn test_color_uses_palette_and_fade() {
        let style = QuadStyle {
            palette: Palette::new().with(Layer::Ember, [1.0, 0.5, 0.25, 0.8]),
            fade: Fade::Linear,
            ..QuadStyle::default()
        };
        let mut p = particle(Vec3::ZERO);
        p.layer = Layer::Ember;
        p.brightness = 2.0;
        p.life = 0.5;
        let c = particle_color(&p, &style);
        assert_eq!(c, [2.0, 1.0, 0.5, 0.4]);
    }

    #[test]
    fn test_fade_in_out() {
        let fade = Fade::InOut {
            fade_in: 0.2,
            fade_out: 0.5,
        };
        assert_eq!(fade.alpha(1.0), 0.0);
        assert!((fade.alpha(0.9) - 0.5).abs() < 1e-5);
        assert_eq!(fade.alpha(0.6), 1.0);
        assert!((fade.alpha(0.25) - 0.5).abs() < 1e-5);
        assert_eq!(fade.alpha(0.0), 0.0);
    }

    #[test]
    fn test_size_over_life() {
        assert_eq!(SizeOverLife::Shrink.scale(0.25), 0.25);
        assert_eq!(SizeOverLife::Grow { start: 0.5 }.scale(1.0), 0.5);
        assert_eq!(SizeOverLife::Grow { start: 0.5 }.scale(0.0), 1.0);
    }

    #[test]
    fn test_vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 28);
        let v = Vertex {
            position: [1.0, 2.0, 3.0],
            color: [0.1, 0.2, 0.3, 0.4],
        };
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&v));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 0.4]);
    }
}
