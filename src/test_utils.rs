//! Test utilities for three-body simulation tests.
//!
//! Provides fixtures for creating body configurations and assertions for
//! verifying physical invariants like momentum conservation.

use bevy::math::DVec3;

use crate::types::{Bodies, Body};

/// Distance at which the spectator body is parked in fixtures.
pub const FAR_AWAY: f64 = 1000.0;

/// Fixtures for creating test body states.
pub mod fixtures {
    use super::*;
    use crate::rng::SeededRandom;
    use crate::simulation::{spawn_bodies, SpawnConfig};

    /// Bodies 0 and 1 at rest on the x-axis, `separation` apart and centred
    /// on the origin. Body 2 is parked far away on the y-axis.
    pub fn resting_pair(separation: f64) -> Bodies {
        let half = separation * 0.5;
        [
            Body::new(0, DVec3::new(-half, 0.0, 0.0), DVec3::ZERO, 1.0),
            Body::new(1, DVec3::new(half, 0.0, 0.0), DVec3::ZERO, 1.0),
            Body::new(2, DVec3::new(0.0, FAR_AWAY, 0.0), DVec3::ZERO, 1.0),
        ]
    }

    /// Bodies 0 and 1 on a circular orbit around their barycentre.
    ///
    /// Each body moves at `v = sqrt(G m / (2 d))`. Body 2 sits at rest far
    /// away on the z-axis.
    pub fn circular_binary(separation: f64) -> Bodies {
        let gravity = crate::physics::PhysicsConfig::default().gravity;
        let half = separation * 0.5;
        let speed = (gravity / (2.0 * separation)).sqrt();
        [
            Body::new(0, DVec3::new(-half, 0.0, 0.0), DVec3::new(0.0, -speed, 0.0), 1.0),
            Body::new(1, DVec3::new(half, 0.0, 0.0), DVec3::new(0.0, speed, 0.0), 1.0),
            Body::new(2, DVec3::new(0.0, 0.0, FAR_AWAY * 0.5), DVec3::ZERO, 1.0),
        ]
    }

    /// Bodies spawned from `seed` with the default spawn configuration.
    pub fn spawned(seed: u32) -> Bodies {
        let mut rng = SeededRandom::new(seed);
        spawn_bodies(&mut rng, &SpawnConfig::default())
    }
}

/// Assertions for verifying physical invariants.
pub mod assertions {
    use super::*;

    /// Total linear momentum `Σ m v`.
    pub fn total_momentum(bodies: &Bodies) -> DVec3 {
        bodies.iter().map(|b| b.velocity * b.mass).sum()
    }

    /// Pairwise separations in canonical pair order.
    pub fn separations(bodies: &Bodies) -> [f64; crate::types::PAIR_COUNT] {
        crate::types::BodyPair::ALL.map(|pair| pair.separation(bodies))
    }

    /// Assert a harmony value is a valid score.
    ///
    /// # Panics
    /// Panics if `value` is outside `[0, 1]` or not finite.
    pub fn assert_unit_interval(value: f64) {
        assert!(
            value.is_finite() && (0.0..=1.0).contains(&value),
            "expected a value in [0, 1], got {value}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resting_pair_separation() {
        let bodies = fixtures::resting_pair(3.0);
        assert_relative_eq!(assertions::separations(&bodies)[0], 3.0);
    }

    #[test]
    fn test_circular_binary_has_zero_momentum() {
        let bodies = fixtures::circular_binary(6.0);
        assert!(assertions::total_momentum(&bodies).length() < 1e-12);
    }

    #[test]
    fn test_spawned_is_deterministic() {
        assert_eq!(fixtures::spawned(7), fixtures::spawned(7));
        assert_ne!(fixtures::spawned(7), fixtures::spawned(8));
    }
}
