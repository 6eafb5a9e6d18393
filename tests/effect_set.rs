//! End-to-end tests: config text in, meshes out.

use glam::Vec3;
use warchief_fx::{Effect, EffectSet, EffectsConfig, ViewBasis};

fn run_all(effects: &mut EffectSet, frames: usize) {
    let view = ViewBasis::isometric();
    for i in 0..frames {
        let t = i as f32 / 60.0;
        effects.wind_mut().set_intensity(1.0);
        effects.meteors_mut().set_intensity(1.0);
        effects.mana_sparkle_mut().set_mana_fraction(0.8);
        effects
            .comet_tail_mut()
            .set_head(Vec3::new(t * 3.0, 20.0, 0.0));
        effects.dust_devil_mut().set_anchor(Vec3::new(0.0, 0.0, t));
        effects.update(1.0 / 60.0, &view);
    }
}

#[test]
fn test_every_effect_draws_finite_meshes() {
    let mut effects = EffectSet::new(&EffectsConfig::default());
    run_all(&mut effects, 240);

    let mut drawn = 0;
    for (name, mesh) in effects.meshes() {
        drawn += 1;
        assert_eq!(mesh.vertices.len() % 4, 0, "{name}");
        assert_eq!(mesh.indices.len(), mesh.quad_count() * 6, "{name}");
        for v in &mesh.vertices {
            assert!(v.position.iter().all(|c| c.is_finite()), "{name}");
            assert!(v.color.iter().all(|c| c.is_finite() && *c >= 0.0), "{name}");
        }
    }
    assert!(drawn >= 4, "only {drawn} effect(s) drew");
}

#[test]
fn test_capacity_bounds_hold_under_load() {
    let json = r#"{
        "wind": { "capacity": 8, "max_rate": 1000.0 },
        "comet_tail": { "capacity": 8 },
        "meteors": { "capacity": 8 },
        "dust_devil": { "capacity": 8 },
        "mana_sparkle": { "capacity": 8 }
    }"#;
    let config = EffectsConfig::from_json(json).unwrap();
    let mut effects = EffectSet::new(&config);
    run_all(&mut effects, 120);
    for effect in effects.effects() {
        assert!(effect.active_count() <= 8, "{}", effect.name());
    }
    for (_, mesh) in effects.meshes() {
        assert!(mesh.quad_count() <= 8);
    }
}

#[test]
fn test_seeded_config_replays_exactly() {
    let json = r#"{
        "wind": { "seed": 1 },
        "comet_tail": { "seed": 2 },
        "meteors": { "seed": 3 },
        "dust_devil": { "seed": 4 },
        "mana_sparkle": { "seed": 5 }
    }"#;
    let config = EffectsConfig::from_json(json).unwrap();
    let mut a = EffectSet::new(&config);
    let mut b = EffectSet::new(&config);
    run_all(&mut a, 180);
    run_all(&mut b, 180);

    let meshes_a: Vec<_> = a.meshes().collect();
    let meshes_b: Vec<_> = b.meshes().collect();
    assert_eq!(meshes_a, meshes_b);
}

#[test]
fn test_huge_frame_delta_is_clamped() {
    let mut effects = EffectSet::new(&EffectsConfig::default());
    effects.update(30.0, &ViewBasis::isometric());
    assert!((effects.clock().delta() - 0.1).abs() < 1e-6);
}
