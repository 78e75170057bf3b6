//! Variance- and periodicity-based orbit stability scoring.
//!
//! A pair in a stable orbit keeps its separation, angular momentum and
//! energy nearly constant (or at least repeating). The score combines the
//! coefficient of variation of each quantity, weighted and normalized by a
//! threshold, into a value in `[0, 1]`: near 1 for a steady orbit, 0 once the
//! combined variation reaches 1.

use crate::prediction::PredictedTrajectory;
use crate::types::BodyPair;

use super::history::OrbitalSample;
use super::HarmonyConfig;

/// Means below this magnitude are treated as zero.
const MEAN_EPSILON: f64 = 1e-12;

/// Standard deviation divided by the mean.
///
/// The sign follows the mean, so a steady negative series such as the
/// energy of a bound pair yields a negative value. Returns 0 for an empty
/// series or a constant zero series, and infinity for a series that varies
/// around a zero mean.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if mean.abs() < MEAN_EPSILON {
        return if std_dev < MEAN_EPSILON { 0.0 } else { f64::INFINITY };
    }

    std_dev / mean
}

/// Autocorrelation-style periodicity score of a series in `[0, 1]`.
///
/// For each lag in `1..min(len / 2.5, max_lag)` the mean absolute difference
/// between the series and its shifted copy is compared with the series mean;
/// the best lag wins. Scores at or below the floor are reported as 0.
pub fn detect_periodicity(values: &[f64], config: &HarmonyConfig) -> f64 {
    if values.len() < config.periodicity_min_len {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean <= 0.0 {
        return 0.0;
    }

    let max_lag = ((values.len() as f64 / 2.5).floor() as usize).min(config.periodicity_max_lag);
    let mut best = 0.0_f64;

    for lag in 1..max_lag {
        let count = values.len() - lag;
        let total: f64 = values
            .iter()
            .zip(&values[lag..])
            .map(|(a, b)| (a - b).abs())
            .sum();
        let mean_diff = total / count as f64;
        let correlation = 1.0 - (mean_diff / mean).min(1.0);
        best = best.max(correlation);
    }

    if best > config.periodicity_floor { best } else { 0.0 }
}

/// Score the stability of the most recent `window` samples.
///
/// With `enhanced` set, the variance score is blended with the periodicity
/// of the distance series (`pattern_weight` share).
pub fn analyze_orbit_stability(
    samples: &[OrbitalSample],
    window: usize,
    enhanced: bool,
    config: &HarmonyConfig,
) -> f64 {
    let start = samples.len().saturating_sub(window);
    let recent = &samples[start..];
    if recent.is_empty() {
        return 0.0;
    }

    let distances: Vec<f64> = recent.iter().map(|s| s.distance).collect();
    let angular: Vec<f64> = recent.iter().map(|s| s.angular_momentum).collect();
    let energies: Vec<f64> = recent.iter().map(|s| s.orbital_energy).collect();

    let pattern = if enhanced && distances.len() > 10 {
        detect_periodicity(&distances, config)
    } else {
        0.0
    };

    let combined = coefficient_of_variation(&distances) / config.distance_variance_threshold
        * config.distance_weight
        + coefficient_of_variation(&angular) / config.angular_variance_threshold
            * config.angular_weight
        + coefficient_of_variation(&energies) / config.energy_variance_threshold
            * config.energy_weight;

    // NaN or infinite variation fails this test and scores 0. A negative
    // energy term can push the score above 1 before clamping.
    if combined < 1.0 {
        let mut score = (1.0 - combined).max(0.0);
        if enhanced {
            score = score * (1.0 - config.pattern_weight) + pattern * config.pattern_weight;
        }
        score.powf(config.score_exponent).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Build orbital samples for `pair` from a predicted trajectory.
///
/// Resamples the trajectory at up to `future_max_samples` evenly spaced
/// steps and estimates velocities by finite differences between adjacent
/// samples (backward difference for the last one).
pub fn synthetic_future_samples(
    trajectory: &PredictedTrajectory,
    pair: BodyPair,
    masses: (f64, f64),
    gravity: f64,
    start_time: f64,
    config: &HarmonyConfig,
) -> Vec<OrbitalSample> {
    let len = trajectory.len();
    let sample_count = config
        .future_max_samples
        .min((len as f64 / 1.5).floor() as usize);
    if sample_count < 2 {
        return Vec::new();
    }

    let interval = len / sample_count;
    let dt = trajectory.time_step();
    let span = interval as f64 * dt;
    let path_a = trajectory.path(pair.first());
    let path_b = trajectory.path(pair.second());

    (0..sample_count)
        .map(|i| {
            let index = i * interval;
            let (from, to) = if i + 1 < sample_count {
                (index, index + interval)
            } else {
                (index - interval, index)
            };

            let velocity_a = (path_a[to] - path_a[from]) / span;
            let velocity_b = (path_b[to] - path_b[from]) / span;

            OrbitalSample::from_relative(
                path_a[index] - path_b[index],
                velocity_a - velocity_b,
                masses,
                gravity,
                start_time + index as f64 * dt,
            )
        })
        .collect()
}
