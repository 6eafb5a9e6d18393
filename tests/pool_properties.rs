//! Integration tests for the pool, emission and batching contracts.
//!
//! These go through the public API only, the way a renderer or game loop
//! would use the crate.

use glam::Vec3;
use warchief_fx::emission::{Emission, EmissionPolicy};
use warchief_fx::mesh::{MeshBatcher, QuadShape, QuadStyle, ViewBasis, QUAD_INDICES};
use warchief_fx::pool::{ParticlePool, SlotSearch};
use warchief_fx::system::ParticleSystem;

// ============================================================================
// Pool lifecycle
// ============================================================================

#[test]
fn test_full_pool_rejects_spawns() {
    for search in [SlotSearch::LinearScan, SlotSearch::FreeList] {
        let mut pool = ParticlePool::with_search(16, search);
        for _ in 0..16 {
            assert!(pool.spawn(|p| p.set_life(1.0)));
        }
        assert!(!pool.spawn(|p| p.set_life(1.0)));
        assert_eq!(pool.active_count(), 16);
        assert!(pool.is_full());
    }
}

#[test]
fn test_capacity_four_expires_and_recycles() {
    let mut pool = ParticlePool::with_capacity(4);
    for i in 0..4 {
        assert!(pool.spawn(|p| {
            p.position = Vec3::new(i as f32, 0.0, 0.0);
            p.set_life(1.0);
        }));
    }
    assert_eq!(pool.advance(1.1), 4);
    assert_eq!(pool.active_count(), 0);
    assert!(pool.iter_active().next().is_none());
    assert!(pool.spawn(|p| p.set_life(1.0)));
    assert_eq!(pool.active_count(), 1);
}

#[test]
fn test_expired_particles_are_not_batched() {
    let mut pool = ParticlePool::with_capacity(8);
    pool.spawn(|p| p.set_life(0.2));
    pool.spawn(|p| p.set_life(2.0));
    let mut batcher = MeshBatcher::new(QuadStyle::default());
    let view = ViewBasis::isometric();

    pool.advance(0.1);
    pool.advance(0.15);
    let mesh = batcher.rebuild(&pool, &view).unwrap();
    assert_eq!(mesh.quad_count(), 1);
    assert_eq!(mesh.index_count(), 6);
}

#[test]
fn test_init_is_idempotent() {
    let mut pool = ParticlePool::new();
    assert!(pool.init(32));
    pool.spawn(|p| p.set_life(1.0));
    assert!(!pool.init(64));
    assert_eq!(pool.capacity(), 32);
    assert_eq!(pool.active_count(), 1);
}

// ============================================================================
// Emission
// ============================================================================

#[test]
fn test_long_run_emission_converges() {
    let rate = 7.3;
    let dt = 1.0 / 144.0;
    let frames = 144 * 20;
    let mut policy = EmissionPolicy::new(Emission::Continuous { rate });
    let total: u64 = (0..frames).map(|_| policy.spawn_count(1.0, dt) as u64).sum();
    let expected = rate as f64 * frames as f64 * dt as f64;
    assert!((total as f64 - expected).abs() < 1.0, "{total} vs {expected}");
}

#[test]
fn test_scaled_emission_follows_signal() {
    let mut sys = ParticleSystem::new(
        "scaled",
        1024,
        Emission::Scaled { max_rate: 100.0 },
        QuadStyle::default(),
    );
    let view = ViewBasis::default();
    let mut spawned = 0;
    for _ in 0..60 {
        spawned += sys.step(1.0 / 60.0, 0.25, &view, |p| p.set_life(10.0)).spawned;
    }
    assert!((24..=25).contains(&spawned), "{spawned}");
}

#[test]
fn test_burst_ignores_rate_and_dt() {
    let mut sys = ParticleSystem::new("burst", 64, Emission::Burst { count: 12 }, QuadStyle::default());
    let view = ViewBasis::default();
    assert_eq!(sys.step(1.0, 1.0, &view, |p| p.set_life(1.0)).spawned, 0);
    sys.emission_mut().trigger();
    assert_eq!(sys.step(0.0, 0.0, &view, |p| p.set_life(1.0)).spawned, 12);
    assert_eq!(sys.step(0.0, 0.0, &view, |p| p.set_life(1.0)).spawned, 0);
}

// ============================================================================
// Batching
// ============================================================================

#[test]
fn test_empty_pool_yields_no_mesh() {
    let pool = ParticlePool::with_capacity(8);
    let mut batcher = MeshBatcher::new(QuadStyle::default());
    assert!(batcher.rebuild(&pool, &ViewBasis::isometric()).is_none());
}

#[test]
fn test_resting_streak_is_finite() {
    let mut pool = ParticlePool::with_capacity(1);
    pool.spawn(|p| {
        p.set_life(1.0);
        p.velocity = Vec3::ZERO;
        p.size = 0.2;
    });
    let style = QuadStyle {
        shape: QuadShape::Streak { stretch: 0.5 },
        ..QuadStyle::default()
    };
    let mut batcher = MeshBatcher::new(style);
    let mesh = batcher.rebuild(&pool, &ViewBasis::isometric()).unwrap();
    assert_eq!(mesh.vertices.len(), 4);
    for v in &mesh.vertices {
        assert!(v.position.iter().all(|c| c.is_finite()));
        assert!(v.color.iter().all(|c| c.is_finite()));
    }
}

#[test]
fn test_indices_reference_own_quad() {
    let mut pool = ParticlePool::with_capacity(5);
    for i in 0..5 {
        pool.spawn(|p| {
            p.position = Vec3::new(i as f32, 0.0, 0.0);
            p.set_life(1.0);
        });
    }
    let mut batcher = MeshBatcher::new(QuadStyle::default());
    let mesh = batcher.rebuild(&pool, &ViewBasis::isometric()).unwrap();
    assert_eq!(mesh.vertices.len(), 20);
    assert_eq!(mesh.indices.len(), 30);
    for (quad, chunk) in mesh.indices.chunks(6).enumerate() {
        let base = quad as u32 * 4;
        let expected: Vec<u32> = QUAD_INDICES.iter().map(|i| base + i).collect();
        assert_eq!(chunk, expected.as_slice());
    }
}

#[test]
fn test_vertex_is_tightly_packed() {
    use warchief_fx::mesh::Vertex;
    assert_eq!(std::mem::size_of::<Vertex>(), 28);
    let v = [Vertex {
        position: [1.0, 2.0, 3.0],
        color: [0.1, 0.2, 0.3, 0.4],
    }];
    let floats: &[f32] = bytemuck::cast_slice(&v);
    assert_eq!(floats, &[1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 0.4]);
}
