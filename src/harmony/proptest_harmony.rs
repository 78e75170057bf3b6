//! Property-based tests for harmony scoring using proptest.

use proptest::prelude::*;

use super::{analyze_orbit_stability, HarmonyAnalyzer, HarmonyConfig, OrbitHistory, OrbitalSample};
use crate::collision::detect_collision;
use crate::physics::{semi_implicit_euler_step, PhysicsConfig};
use crate::prediction::{predict, PredictionSettings};
use crate::test_utils::fixtures;
use crate::types::{BodyPair, COLLISION_DISTANCE, MAX_SEED};

fn sample_strategy() -> impl Strategy<Value = OrbitalSample> {
    (0.1f64..50.0, 0.0f64..100.0, -100.0f64..100.0).prop_map(|(distance, angular_momentum, orbital_energy)| {
        OrbitalSample {
            distance,
            angular_momentum,
            orbital_energy,
            time: 0.0,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The history never grows past its capacity and always drops the oldest sample.
    #[test]
    fn prop_history_bounded(pushes in 0usize..800) {
        let mut history = OrbitHistory::new(250);
        for i in 0..pushes {
            history.push(OrbitalSample { time: i as f64, ..Default::default() });
        }

        prop_assert_eq!(history.len(), pushes.min(250));
        if pushes > 0 {
            let oldest = history.iter().next().map(|s| s.time);
            prop_assert_eq!(oldest, Some(pushes.saturating_sub(250) as f64));
        }
    }

    /// Stability scores are always valid harmony values.
    #[test]
    fn prop_stability_in_unit_interval(
        samples in prop::collection::vec(sample_strategy(), 0..120),
        window in 1usize..80,
        enhanced in any::<bool>(),
    ) {
        let score = analyze_orbit_stability(&samples, window, enhanced, &HarmonyConfig::default());
        prop_assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Harmony stays in [0, 1] and no orbiting pair has a collision forecast.
    #[test]
    fn prop_harmony_valid_for_random_spawns(seed in 0u32..MAX_SEED) {
        let physics = PhysicsConfig::default();
        let settings = PredictionSettings { steps: 300, ..Default::default() };
        let mut bodies = fixtures::spawned(seed);
        let mut analyzer = HarmonyAnalyzer::default();

        for tick in 0..80u64 {
            semi_implicit_euler_step(&mut bodies, &physics);
            if detect_collision(&bodies, COLLISION_DISTANCE, 0.0).is_some() {
                break;
            }
            let prediction = predict(&bodies, &physics, &settings);
            let sampled = analyzer
                .observe(tick, &bodies, &prediction, physics.gravity, tick as f64 * physics.time_step)
                .is_some();

            for value in analyzer.harmony_values() {
                prop_assert!((0.0..=1.0).contains(&value), "harmony {} out of range", value);
            }
            if !sampled {
                continue;
            }
            for pair in BodyPair::ALL {
                if prediction.forecasts_collision(pair) {
                    prop_assert!(!analyzer.is_orbiting(pair));
                }
            }
        }
    }
}
