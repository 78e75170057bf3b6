//! Collision detection between live bodies.
//!
//! A collision is the only way an episode ends on its own. Every frame,
//! after integration, each pair is checked in canonical order; the first
//! pair found closer than the collision distance wins. On collision:
//! - The current attempt is archived and logged
//! - The run manager starts a fresh episode
//!
//! When several pairs cross the threshold in the same frame only the first
//! in scan order ({0,1}, {0,2}, {1,2}) is reported.

use bevy::math::DVec3;
use bevy::prelude::*;

use crate::episode::RunManager;
use crate::types::{Bodies, BodyPair};

/// A collision between two live bodies.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionEvent {
    /// The two bodies that touched.
    pub pair: BodyPair,
    /// Point halfway between the two bodies.
    pub midpoint: DVec3,
    /// Separation at the moment of detection.
    pub distance: f64,
    /// Simulation time of the collision (seconds since episode start).
    pub time: f64,
}

impl CollisionEvent {
    /// Human-readable reason used in the run log.
    pub fn reason(&self) -> String {
        format!("Collision between {}", self.pair)
    }
}

/// Find the first pair closer than `collision_distance`, if any.
pub fn detect_collision(bodies: &Bodies, collision_distance: f64, time: f64) -> Option<CollisionEvent> {
    BodyPair::ALL.into_iter().find_map(|pair| {
        let distance = pair.separation(bodies);
        (distance < collision_distance).then(|| CollisionEvent {
            pair,
            midpoint: pair.midpoint(bodies),
            distance,
            time,
        })
    })
}

/// Check the freshly integrated bodies for a collision.
///
/// Runs after `physics_step`. A collision ends the episode and resets the
/// simulation; later stages of the same frame are skipped.
pub fn check_collisions(mut manager: ResMut<RunManager>) {
    manager.check_collision();
}
