//! Headless projectile demo
//!
//! A turret at the origin fires bursts of pooled projectiles in random
//! directions at a ring of static targets. Projectiles that miss run out their
//! lifespan. Pool reuse and the live counter are logged once per second.
//!
//! Usage: `projectile_demo [config.toml|config.ron]`

use rand::prelude::*;
use tick_pool::foundation::logging;
use tick_pool::prelude::*;

const FRAME_RATE: f32 = 60.0;
const DEMO_SECONDS: u32 = 10;
const SHOTS_PER_BURST: usize = 4;
const BURST_INTERVAL: u64 = 6; // frames
const TARGET_COUNT: usize = 12;
const TARGET_RING_RADIUS: f32 = 6000.0;
const TARGET_RADIUS: f32 = 600.0;

fn load_config() -> Result<SimulationConfig, SimError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading configuration from {path}");
            Ok(SimulationConfig::load_from_file(&path)?)
        }
        None => {
            log::info!("No configuration given, using defaults");
            Ok(SimulationConfig::default())
        }
    }
}

fn place_targets(world: &mut ProjectileWorld) {
    for i in 0..TARGET_COUNT {
        let angle = std::f32::consts::TAU * i as f32 / TARGET_COUNT as f32;
        let center = Vec3::new(angle.cos(), angle.sin(), 0.0) * TARGET_RING_RADIUS;
        world.add_collider(center, TARGET_RADIUS);
    }
}

fn random_muzzle(rng: &mut impl Rng) -> Transform {
    let yaw = rng.gen_range(0.0..std::f32::consts::TAU);
    let pitch = rng.gen_range(-0.05..0.05);
    let rotation = Quat::from_euler_angles(0.0, pitch, yaw);
    Transform::from_position_rotation(Vec3::zeros(), rotation)
}

fn run(config: SimulationConfig) -> Result<(), SimError> {
    let mut world = ProjectileWorld::new(config)?;
    place_targets(&mut world);

    let mut rng = thread_rng();
    let delta_time = 1.0 / FRAME_RATE;
    let total_frames = u64::from(DEMO_SECONDS) * FRAME_RATE as u64;
    let (mut hits, mut expired) = (0, 0);

    for frame in 0..total_frames {
        if frame % BURST_INTERVAL == 0 {
            for _ in 0..SHOTS_PER_BURST {
                world.spawn_projectile(random_muzzle(&mut rng))?;
            }
        }

        let report = world.step(delta_time);
        hits += report.hits;
        expired += report.expired;
        if report.managed.failed > 0 {
            log::warn!("Frame {frame}: {} managed ticks failed", report.managed.failed);
        }

        if (frame + 1) % FRAME_RATE as u64 == 0 {
            let stats = world.pool_stats();
            log::info!(
                "t={:>2}s active={:>3} dormant={:>3} constructed={} recycled={} hits={hits} expired={expired}",
                (frame + 1) / FRAME_RATE as u64,
                world.active_counter().current(),
                stats.dormant,
                stats.constructed,
                stats.recycled,
            );
        }
    }

    let stats = world.pool_stats();
    log::info!(
        "Peak live projectiles: {} (pool constructed {}, recycled {})",
        world.active_counter().peak(),
        stats.constructed,
        stats.recycled
    );
    world.shutdown();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; RUST_LOG still overrides the level
    logging::init_with_level(logging::LevelFilter::Info);

    log::info!("Starting projectile pool demo");

    let config = load_config()?;
    match run(config) {
        Ok(()) => {
            log::info!("Projectile demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Projectile demo failed: {e}");
            Err(e.into())
        }
    }
}
