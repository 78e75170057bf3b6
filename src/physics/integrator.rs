//! Fixed-step semi-implicit Euler integration.
//!
//! Each step computes every body's acceleration from the pre-step positions,
//! then updates velocity first and position second using the new velocity.
//! The live simulation and the trajectory predictor both advance bodies with
//! [`semi_implicit_euler_step`], so predicted paths match live ones exactly.

use crate::types::Bodies;

use super::gravity::compute_accelerations;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the physics integrator.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    /// Gravitational constant. Default: 10 (scaled for visual pacing).
    pub gravity: f64,
    /// Fixed timestep in simulated seconds. Default: 0.05.
    pub time_step: f64,
    /// Pairs at or below this separation exert no force. Default: 0.1.
    pub min_force_distance: f64,
    /// Past positions kept per body for time-offset lookups. Default: 20000.
    pub history_capacity: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 10.0,
            time_step: 0.05,
            min_force_distance: 0.1,
            history_capacity: 20_000,
        }
    }
}

// =============================================================================
// Integration step
// =============================================================================

/// Advance all bodies by one fixed timestep.
///
/// `v += a * dt` is applied before `p += v * dt`. Changing this order changes
/// every trajectory.
pub fn semi_implicit_euler_step(bodies: &mut Bodies, config: &PhysicsConfig) {
    let accelerations = compute_accelerations(bodies, config);
    let dt = config.time_step;

    for (body, acc) in bodies.iter_mut().zip(accelerations) {
        body.acceleration = acc;
        body.velocity += acc * dt;
        body.position += body.velocity * dt;
    }
}

// =============================================================================
// Tests
// =============================================================================
