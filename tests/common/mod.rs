//! Common test utilities for integration tests.

use bevy::math::DVec3;
use harmonia::physics::PhysicsConfig;
use harmonia::rng::SeededRandom;
use harmonia::simulation::{spawn_bodies, SpawnConfig};
use harmonia::types::{Bodies, Body, BodyPair, PAIR_COUNT};

/// Bodies 0 and 1 at rest `separation` apart; body 2 parked far away.
pub fn resting_pair(separation: f64) -> Bodies {
    let half = separation * 0.5;
    [
        Body::new(0, DVec3::new(-half, 0.0, 0.0), DVec3::ZERO, 1.0),
        Body::new(1, DVec3::new(half, 0.0, 0.0), DVec3::ZERO, 1.0),
        Body::new(2, DVec3::new(0.0, 1000.0, 0.0), DVec3::ZERO, 1.0),
    ]
}

/// Bodies 0 and 1 on a circular orbit; body 2 at rest far along z.
pub fn circular_binary(separation: f64) -> Bodies {
    let gravity = PhysicsConfig::default().gravity;
    let half = separation * 0.5;
    let speed = (gravity / (2.0 * separation)).sqrt();
    [
        Body::new(0, DVec3::new(-half, 0.0, 0.0), DVec3::new(0.0, -speed, 0.0), 1.0),
        Body::new(1, DVec3::new(half, 0.0, 0.0), DVec3::new(0.0, speed, 0.0), 1.0),
        Body::new(2, DVec3::new(0.0, 0.0, 500.0), DVec3::ZERO, 1.0),
    ]
}

/// Bodies spawned from `seed` with default ranges.
pub fn spawned(seed: u32) -> Bodies {
    spawn_bodies(&mut SeededRandom::new(seed), &SpawnConfig::default())
}

/// Total linear momentum.
pub fn total_momentum(bodies: &Bodies) -> DVec3 {
    bodies.iter().map(|b| b.velocity * b.mass).sum()
}

/// Pairwise separations in pair-index order.
pub fn separations(bodies: &Bodies) -> [f64; PAIR_COUNT] {
    BodyPair::ALL.map(|pair| pair.separation(bodies))
}

/// Unique path in the system temp directory.
pub fn temp_file(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("harmonia-it-{}-{}.json", name, std::process::id()))
}
