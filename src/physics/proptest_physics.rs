//! Property-based tests for the integrator using proptest.
//!
//! These tests verify determinism and conservation across arbitrary seeds.

use proptest::prelude::*;

use crate::physics::{compute_accelerations, semi_implicit_euler_step, PhysicsConfig};
use crate::test_utils::{assertions, fixtures};
use crate::types::MAX_SEED;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Two runs from the same seed must produce bit-identical trajectories.
    #[test]
    fn prop_same_seed_same_trajectory(seed in 0u32..MAX_SEED) {
        let config = PhysicsConfig::default();
        let mut a = fixtures::spawned(seed);
        let mut b = fixtures::spawned(seed);

        for _ in 0..100 {
            semi_implicit_euler_step(&mut a, &config);
            semi_implicit_euler_step(&mut b, &config);
        }

        for (x, y) in a.iter().zip(&b) {
            prop_assert_eq!(x.position.to_array(), y.position.to_array());
            prop_assert_eq!(x.velocity.to_array(), y.velocity.to_array());
        }
    }

    /// Spawned bodies stay inside the configured spawn cube.
    #[test]
    fn prop_spawn_within_range(seed in 0u32..MAX_SEED) {
        let bodies = fixtures::spawned(seed);
        for body in &bodies {
            prop_assert!(body.position.abs().max_element() <= 10.0);
            prop_assert!(body.velocity.abs().max_element() <= 1.0);
            prop_assert_eq!(body.mass, 1.0);
        }
    }

    /// Equal masses exchange equal and opposite accelerations.
    #[test]
    fn prop_total_momentum_conserved(seed in 0u32..MAX_SEED) {
        let config = PhysicsConfig::default();
        let mut bodies = fixtures::spawned(seed);
        let initial = assertions::total_momentum(&bodies);

        for _ in 0..50 {
            semi_implicit_euler_step(&mut bodies, &config);
        }

        let drift = (assertions::total_momentum(&bodies) - initial).length();
        prop_assert!(drift < 1e-9, "momentum drift {:.3e}", drift);
    }

    /// Accelerations are always finite, even for overlapping bodies.
    #[test]
    fn prop_accelerations_finite(seed in 0u32..MAX_SEED, overlap in 0.0f64..0.1) {
        let config = PhysicsConfig::default();
        let mut bodies = fixtures::spawned(seed);
        bodies[1].position = bodies[0].position + bevy::math::DVec3::X * overlap;

        for acc in compute_accelerations(&bodies, &config) {
            prop_assert!(acc.is_finite());
        }
    }
}
