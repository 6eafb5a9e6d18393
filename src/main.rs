//! Headless effects driver.
//!
//! Runs every effect at a fixed 60 Hz for a number of frames and logs particle
//! counts and mesh sizes. Useful for tuning configs without a renderer.
//!
//! ```text
//! warchief-fx [config.json] [frames]
//! ```

use anyhow::{Context, Result};
use log::{debug, info};
use std::env;

use warchief_fx::prelude::*;

const FRAME_DT: f32 = 1.0 / 60.0;
const DEFAULT_FRAMES: u64 = 600;

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => EffectsConfig::load(&path)
            .with_context(|| format!("failed to load effects config from '{path}'"))?,
        None => {
            info!("No config given, using defaults");
            EffectsConfig::default()
        }
    };
    let frames = match args.next() {
        Some(n) => n
            .parse::<u64>()
            .with_context(|| format!("frame count '{n}' is not a number"))?,
        None => DEFAULT_FRAMES,
    };

    let mut effects = EffectSet::new(&config);
    let view = ViewBasis::isometric();
    info!("Running {} frames at {:.0} Hz", frames, 1.0 / FRAME_DT);

    let mut peak = 0;
    for frame in 0..frames {
        let t = effects.clock().elapsed();
        drive(&mut effects, t);
        let report = effects.update(FRAME_DT, &view);
        peak = peak.max(effects.active_count());

        for (name, stats) in report {
            if stats.dropped > 0 {
                debug!("frame {}: {} dropped {} spawn(s)", frame, name, stats.dropped);
            }
        }
        if frame % 60 == 59 {
            let counts: Vec<String> = effects
                .effects()
                .iter()
                .map(|e| format!("{}={}", e.name(), e.active_count()))
                .collect();
            info!("t={:.1}s {}", effects.clock().elapsed(), counts.join(" "));
        }
    }

    for (name, mesh) in effects.meshes() {
        let bytes = bytemuck::cast_slice::<Vertex, u8>(&mesh.vertices).len();
        info!(
            "{}: {} quads, {} indices, {} vertex bytes",
            name,
            mesh.quad_count(),
            mesh.index_count(),
            bytes
        );
    }
    info!("Peak active particles: {}", peak);
    Ok(())
}

/// Feed every effect a scripted signal for time `t`.
fn drive(effects: &mut EffectSet, t: f32) {
    let wind = 0.5 + 0.5 * (t * 0.4).sin();
    effects.wind_mut().set_intensity(wind);

    let orbit = Vec3::new((t * 0.3).cos() * 30.0, 25.0, (t * 0.3).sin() * 30.0);
    let heading = Vec3::new(-(t * 0.3).sin(), 0.0, (t * 0.3).cos());
    let comet = effects.comet_tail_mut();
    comet.set_head(orbit);
    comet.set_travel_direction(heading);

    let meteors = effects.meteors_mut();
    meteors.set_target(Vec3::new(5.0, 0.0, -5.0));
    meteors.set_intensity(if (t % 6.0) < 3.0 { 1.0 } else { 0.2 });

    effects
        .dust_devil_mut()
        .set_anchor(Vec3::new(t.sin() * 4.0, 0.0, t * 0.5));

    let mana = effects.mana_sparkle_mut();
    mana.set_anchor(Vec3::new(0.0, 0.0, 0.0));
    mana.set_mana_fraction(1.0 - (t / 10.0).fract());
}
