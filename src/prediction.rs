//! Trajectory prediction for the three bodies.
//!
//! This module runs a forward simulation on a private copy of the live
//! bodies, producing the full predicted path of every body over a fixed
//! horizon and forecasting which pairs will collide within it. The live
//! bodies are only ever borrowed immutably, so prediction cannot disturb the
//! simulation it is predicting.

use bevy::math::DVec3;
use bevy::prelude::*;

use crate::episode::RunManager;
use crate::physics::{semi_implicit_euler_step, PhysicsConfig};
use crate::types::{Bodies, BodyPair, BODY_COUNT, COLLISION_DISTANCE, PAIR_COUNT};

/// Configuration for trajectory prediction.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionSettings {
    /// Number of integration steps per prediction. Default: 3000.
    pub steps: usize,
    /// Separation below which a predicted pair counts as colliding.
    pub collision_distance: f64,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            steps: 3000,
            collision_distance: COLLISION_DISTANCE,
        }
    }
}

/// A collision expected within the prediction horizon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionForecast {
    pub pair: BodyPair,
    /// Zero-based prediction step at which the pair first came too close.
    pub step: usize,
    /// `step * dt`, in simulated seconds.
    pub time_to_collision: f64,
}

/// Predicted future positions for every body.
///
/// `paths[i][k]` is the position of body `i` after `k + 1` steps. Always
/// derived fresh from live state; never carried across frames.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PredictedTrajectory {
    paths: [Vec<DVec3>; BODY_COUNT],
    time_step: f64,
}

impl PredictedTrajectory {
    /// Number of predicted steps (identical for every body).
    pub fn len(&self) -> usize {
        self.paths[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths[0].is_empty()
    }

    /// Timestep the prediction was integrated with.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Predicted path of `body`.
    pub fn path(&self, body: usize) -> &[DVec3] {
        &self.paths[body]
    }

    /// Predicted position of `body` roughly `seconds_ahead` in the future.
    ///
    /// Clamped to the last predicted step.
    pub fn position_at(&self, body: usize, seconds_ahead: f64) -> Option<DVec3> {
        let path = &self.paths[body];
        if path.is_empty() || self.time_step <= 0.0 {
            return None;
        }
        let step = ((seconds_ahead.max(0.0) / self.time_step).floor() as usize).min(path.len() - 1);
        path.get(step).copied()
    }

    /// Points a prediction line for `body` should display at a time offset.
    ///
    /// - `offset == 0`: current position followed by the whole prediction.
    /// - `offset > 0`: current position and the prediction up to the offset.
    /// - `offset < 0`: the past position (when known), the current position,
    ///   then the whole prediction.
    pub fn path_with_offset(
        &self,
        body: usize,
        current: DVec3,
        past: Option<DVec3>,
        offset: f64,
    ) -> Vec<DVec3> {
        let path = &self.paths[body];
        let mut points = Vec::with_capacity(path.len() + 2);

        if offset < 0.0 {
            points.extend(past);
            points.push(current);
            points.extend_from_slice(path);
        } else if offset > 0.0 && !path.is_empty() && self.time_step > 0.0 {
            let end = ((offset / self.time_step).floor() as usize).min(path.len() - 1);
            points.push(current);
            points.extend_from_slice(&path[..=end]);
        } else {
            points.push(current);
            points.extend_from_slice(path);
        }

        points
    }
}

/// Output of one prediction pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Prediction {
    pub trajectory: PredictedTrajectory,
    /// At most one forecast per pair, in the order they were detected.
    pub forecasts: Vec<CollisionForecast>,
}

impl Prediction {
    /// Forecast for `pair`, if one was found.
    pub fn forecast_for(&self, pair: BodyPair) -> Option<&CollisionForecast> {
        self.forecasts.iter().find(|f| f.pair == pair)
    }

    /// Whether any collision is forecast for `pair`.
    pub fn forecasts_collision(&self, pair: BodyPair) -> bool {
        self.forecast_for(pair).is_some()
    }

    /// The soonest forecast collision.
    pub fn earliest_forecast(&self) -> Option<&CollisionForecast> {
        self.forecasts.iter().min_by_key(|f| f.step)
    }
}

/// Predict the trajectories of `bodies` over the configured horizon.
///
/// Uses exactly the live integration rule. The first step at which each
/// pair's separation drops below the collision distance is recorded; the
/// simulation still runs the full horizon so every path has `steps` points.
///
/// Pure function of its inputs: the same live state always yields the same
/// prediction.
pub fn predict(bodies: &Bodies, physics: &PhysicsConfig, settings: &PredictionSettings) -> Prediction {
    let mut scratch = bodies.clone();
    let mut paths: [Vec<DVec3>; BODY_COUNT] =
        std::array::from_fn(|_| Vec::with_capacity(settings.steps));
    let mut forecasts = Vec::new();
    let mut forecast_seen = [false; PAIR_COUNT];

    for step in 0..settings.steps {
        semi_implicit_euler_step(&mut scratch, physics);

        for (path, body) in paths.iter_mut().zip(&scratch) {
            path.push(body.position);
        }

        for pair in BodyPair::ALL {
            if forecast_seen[pair.index()] {
                continue;
            }
            if pair.separation(&scratch) < settings.collision_distance {
                forecast_seen[pair.index()] = true;
                forecasts.push(CollisionForecast {
                    pair,
                    step,
                    time_to_collision: step as f64 * physics.time_step,
                });
            }
        }
    }

    Prediction {
        trajectory: PredictedTrajectory {
            paths,
            time_step: physics.time_step,
        },
        forecasts,
    }
}

/// Recompute the prediction from the post-collision-check live state.
///
/// Runs every frame before the harmony update so harmony always sees this
/// frame's prediction.
pub fn predict_trajectories(mut manager: ResMut<RunManager>) {
    manager.predict();
}
