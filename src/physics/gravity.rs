//! Pairwise gravitational acceleration between the three bodies.

use bevy::math::DVec3;

use crate::types::{Bodies, BODY_COUNT};

use super::PhysicsConfig;

/// Compute the gravitational acceleration acting on body `index`.
///
/// Sums `G * m_j * normalize(p_j - p_i) / |p_j - p_i|²` over every other body.
/// Pairs closer than `min_force_distance` contribute nothing, which keeps the
/// sum finite when two bodies overlap.
///
/// # Arguments
/// * `bodies` - Current body states
/// * `index` - Body to compute the acceleration for
/// * `config` - Gravitational constant and singularity guard
#[inline]
pub fn compute_acceleration(bodies: &Bodies, index: usize, config: &PhysicsConfig) -> DVec3 {
    let body = &bodies[index];
    let mut acc = DVec3::ZERO;

    for (other_index, other) in bodies.iter().enumerate() {
        if other_index == index {
            continue;
        }

        let delta = other.position - body.position;
        let distance = delta.length();

        if distance > config.min_force_distance {
            let force = config.gravity * body.mass * other.mass / (distance * distance);
            acc += delta * (1.0 / distance) * (force / body.mass);
        }
    }

    acc
}

/// Accelerations for all bodies, computed from the same positions.
pub fn compute_accelerations(bodies: &Bodies, config: &PhysicsConfig) -> [DVec3; BODY_COUNT] {
    std::array::from_fn(|index| compute_acceleration(bodies, index, config))
}
