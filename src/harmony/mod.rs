//! Orbit detection and harmony scoring for body pairs.
//!
//! Every `check_interval` ticks the relative state of each pair is sampled
//! into a bounded history. The history and a resampled copy of the current
//! prediction are both scored for stability; the blend is smoothed into a
//! per-pair harmony value in `[0, 1]`. Pairs are classified as orbiting with
//! hysteresis:
//! - Enter when harmony rises above `enter_threshold`
//! - Leave when harmony falls below `exit_threshold`
//! - Leave immediately, with harmony forced to 0, when a collision is forecast

mod history;
mod stability;

#[cfg(test)]
mod proptest_harmony;

use bevy::prelude::*;

pub use history::{OrbitHistory, OrbitalSample};
pub use stability::{
    analyze_orbit_stability, coefficient_of_variation, detect_periodicity,
    synthetic_future_samples,
};

use crate::episode::RunManager;
use crate::prediction::Prediction;
use crate::types::{Bodies, BodyPair, BODY_COUNT, PAIR_COUNT};

/// Tuning for sampling, scoring and classification.
#[derive(Clone, Debug, PartialEq)]
pub struct HarmonyConfig {
    /// Samples kept per pair.
    pub history_capacity: usize,
    /// Ticks between samples.
    pub check_interval: u64,
    /// Samples required before a pair is scored at all.
    pub min_samples: usize,
    /// Most recent samples used for the historical score.
    pub window: usize,
    pub distance_variance_threshold: f64,
    pub angular_variance_threshold: f64,
    pub energy_variance_threshold: f64,
    pub distance_weight: f64,
    pub angular_weight: f64,
    pub energy_weight: f64,
    pub score_exponent: f64,
    /// Share of the periodicity score in an enhanced stability score.
    pub pattern_weight: f64,
    /// Periodicity scores at or below this are discarded.
    pub periodicity_floor: f64,
    pub periodicity_min_len: usize,
    pub periodicity_max_lag: usize,
    /// Share of the predicted-future score in the combined score.
    pub future_weight: f64,
    pub future_max_samples: usize,
    /// Synthetic samples required before the future is scored.
    pub future_min_samples: usize,
    /// Weight kept by the previous harmony on each update.
    pub smoothing: f64,
    pub enter_threshold: f64,
    pub exit_threshold: f64,
    /// Rise in one update that triggers a focus hint.
    pub focus_rise: f64,
}

impl Default for HarmonyConfig {
    fn default() -> Self {
        Self {
            history_capacity: 250,
            check_interval: 2,
            min_samples: 5,
            window: 50,
            distance_variance_threshold: 0.5,
            angular_variance_threshold: 0.5,
            energy_variance_threshold: 0.5,
            distance_weight: 0.5,
            angular_weight: 0.3,
            energy_weight: 0.2,
            score_exponent: 0.9,
            pattern_weight: 0.1,
            periodicity_floor: 0.2,
            periodicity_min_len: 15,
            periodicity_max_lag: 50,
            future_weight: 0.3,
            future_max_samples: 50,
            future_min_samples: 20,
            smoothing: 0.7,
            enter_threshold: 0.65,
            exit_threshold: 0.4,
            focus_rise: 0.02,
        }
    }
}

/// Why a pair stopped orbiting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LeaveCause {
    LowHarmony,
    /// A collision was forecast this many simulated seconds ahead.
    ForecastCollision { time_to_collision: f64 },
}

/// Change in a pair's orbiting classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OrbitChange {
    Entered,
    Left(LeaveCause),
}

/// Harmony value and classification of one pair.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PairHarmony {
    pub value: f64,
    pub orbiting: bool,
}

impl PairHarmony {
    /// Exponentially smooth `combined` into the current value.
    pub fn blend(&mut self, combined: f64, smoothing: f64) {
        self.value = self.value * smoothing + combined * (1.0 - smoothing);
    }

    pub fn set(&mut self, value: f64) {
        self.value = value;
    }

    /// Apply the hysteresis thresholds to the current value.
    ///
    /// Forecast collisions never reach this: they go through
    /// [`force_collision`](Self::force_collision) instead.
    pub fn classify(&mut self, config: &HarmonyConfig) -> Option<OrbitChange> {
        if self.value > config.enter_threshold && !self.orbiting {
            self.orbiting = true;
            Some(OrbitChange::Entered)
        } else if self.value < config.exit_threshold && self.orbiting {
            self.orbiting = false;
            Some(OrbitChange::Left(LeaveCause::LowHarmony))
        } else {
            None
        }
    }

    /// A collision is forecast: zero the harmony and drop any orbit.
    pub fn force_collision(&mut self, time_to_collision: f64) -> Option<OrbitChange> {
        self.value = 0.0;
        if self.orbiting {
            self.orbiting = false;
            Some(OrbitChange::Left(LeaveCause::ForecastCollision { time_to_collision }))
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Hint for a graph view to zoom onto a pair whose harmony is climbing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusHint {
    pub pair: BodyPair,
    pub harmony: f64,
}

/// A classification change for one pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitTransition {
    pub pair: BodyPair,
    pub change: OrbitChange,
}

/// Outputs of one harmony update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HarmonyUpdate {
    pub focus_hints: Vec<FocusHint>,
    pub transitions: Vec<OrbitTransition>,
}

/// Per-pair sample histories, harmony values and orbit classification.
#[derive(Clone, Debug)]
pub struct HarmonyAnalyzer {
    config: HarmonyConfig,
    histories: [OrbitHistory; PAIR_COUNT],
    pairs: [PairHarmony; PAIR_COUNT],
}

impl Default for HarmonyAnalyzer {
    fn default() -> Self {
        Self::new(HarmonyConfig::default())
    }
}

impl HarmonyAnalyzer {
    pub fn new(config: HarmonyConfig) -> Self {
        let histories = std::array::from_fn(|_| OrbitHistory::new(config.history_capacity));
        Self {
            config,
            histories,
            pairs: [PairHarmony::default(); PAIR_COUNT],
        }
    }

    pub fn config(&self) -> &HarmonyConfig {
        &self.config
    }

    /// Sample on every `check_interval`-th tick and rescore all pairs.
    ///
    /// Returns `None` on ticks that are not sampled.
    pub fn observe(
        &mut self,
        tick: u64,
        bodies: &Bodies,
        prediction: &Prediction,
        gravity: f64,
        time: f64,
    ) -> Option<HarmonyUpdate> {
        if tick % self.config.check_interval.max(1) != 0 {
            return None;
        }
        self.record_samples(bodies, gravity, time);
        Some(self.update(bodies, prediction, gravity, time))
    }

    /// Append the current relative state of every pair to its history.
    pub fn record_samples(&mut self, bodies: &Bodies, gravity: f64, time: f64) {
        for pair in BodyPair::ALL {
            let sample = OrbitalSample::between(&bodies[pair.first()], &bodies[pair.second()], gravity, time);
            self.histories[pair.index()].push(sample);
        }
    }

    /// Rescore every pair from its history and `prediction`.
    pub fn update(
        &mut self,
        bodies: &Bodies,
        prediction: &Prediction,
        gravity: f64,
        time: f64,
    ) -> HarmonyUpdate {
        let mut update = HarmonyUpdate::default();

        for pair in BodyPair::ALL {
            let index = pair.index();

            if let Some(forecast) = prediction.forecast_for(pair) {
                if let Some(change) = self.pairs[index].force_collision(forecast.time_to_collision) {
                    self.report(pair, change, &mut update);
                }
                continue;
            }

            let history = &self.histories[index];
            if history.len() < self.config.min_samples {
                self.pairs[index].set(0.0);
            } else {
                let samples = history.recent(self.config.window);
                let historical = analyze_orbit_stability(&samples, samples.len(), true, &self.config);

                let future_samples = synthetic_future_samples(
                    &prediction.trajectory,
                    pair,
                    (bodies[pair.first()].mass, bodies[pair.second()].mass),
                    gravity,
                    time,
                    &self.config,
                );
                let future = if future_samples.len() >= self.config.future_min_samples {
                    analyze_orbit_stability(&future_samples, future_samples.len(), true, &self.config)
                } else {
                    0.0
                };

                let combined =
                    historical * (1.0 - self.config.future_weight) + future * self.config.future_weight;
                let previous = self.pairs[index].value;
                self.pairs[index].blend(combined, self.config.smoothing);

                let harmony = self.pairs[index].value;
                if harmony > previous + self.config.focus_rise {
                    update.focus_hints.push(FocusHint { pair, harmony });
                }
            }

            if let Some(change) = self.pairs[index].classify(&self.config) {
                self.report(pair, change, &mut update);
            }
        }

        update
    }

    fn report(&self, pair: BodyPair, change: OrbitChange, update: &mut HarmonyUpdate) {
        match change {
            OrbitChange::Entered => info!(
                "{} are now orbiting with harmony {:.2}",
                pair,
                self.pairs[pair.index()].value
            ),
            OrbitChange::Left(LeaveCause::LowHarmony) => {
                info!("{} are no longer orbiting due to low harmony", pair)
            }
            OrbitChange::Left(LeaveCause::ForecastCollision { time_to_collision }) => info!(
                "{} lost harmony due to predicted collision in {:.2}s",
                pair, time_to_collision
            ),
        }
        update.transitions.push(OrbitTransition { pair, change });
    }

    /// Harmony of `pair`.
    pub fn harmony(&self, pair: BodyPair) -> f64 {
        self.pairs[pair.index()].value
    }

    /// Harmony of every pair in pair-index order.
    pub fn harmony_values(&self) -> [f64; PAIR_COUNT] {
        self.pairs.map(|p| p.value)
    }

    pub fn pair_state(&self, pair: BodyPair) -> PairHarmony {
        self.pairs[pair.index()]
    }

    pub fn is_orbiting(&self, pair: BodyPair) -> bool {
        self.pairs[pair.index()].orbiting
    }

    /// Pairs currently classified as orbiting, in pair-index order.
    pub fn orbiting_pairs(&self) -> Vec<BodyPair> {
        BodyPair::ALL
            .into_iter()
            .filter(|pair| self.is_orbiting(*pair))
            .collect()
    }

    /// Bodies that belong to at least one orbiting pair, ascending.
    pub fn orbiting_bodies(&self) -> Vec<usize> {
        (0..BODY_COUNT)
            .filter(|&body| {
                BodyPair::ALL
                    .iter()
                    .any(|pair| pair.contains(body) && self.is_orbiting(*pair))
            })
            .collect()
    }

    /// Highlight intensity of `body`: the best harmony among its two pairs.
    pub fn body_intensity(&self, body: usize) -> f64 {
        BodyPair::ALL
            .iter()
            .filter(|pair| pair.contains(body))
            .map(|pair| self.harmony(*pair))
            .fold(0.0, f64::max)
    }

    pub fn history(&self, pair: BodyPair) -> &OrbitHistory {
        &self.histories[pair.index()]
    }

    /// Drop every sample, harmony value and orbit.
    pub fn clear(&mut self) {
        for history in &mut self.histories {
            history.clear();
        }
        for pair in &mut self.pairs {
            pair.reset();
        }
    }
}

/// Sample pairs and rescore harmony against this frame's prediction.
pub fn update_harmony(mut manager: ResMut<RunManager>) {
    manager.update_harmony();
}
