//! Live simulation state and the Bevy plugin that drives it.
//!
//! [`SimulationState`] owns everything that belongs to one episode: the
//! bodies, their position history, the clock, the latest prediction, the
//! harmony analyzer and the graph series. Replacing it wholesale is how an
//! episode resets, so no partially reset state is ever observable.
//!
//! [`SimulationPlugin`] registers the [`EpisodeCommand`] message and the
//! per-frame pipeline:
//! `apply_episode_commands → physics_step → check_collisions →
//! predict_trajectories → update_harmony → finish_frame`.

use std::path::PathBuf;

use bevy::math::DVec3;
use bevy::prelude::*;

use crate::collision::{check_collisions, detect_collision, CollisionEvent};
use crate::config::EngineConfig;
use crate::episode::{apply_episode_commands, finish_frame, EpisodeCommand, JsonFileStore, RunManager};
use crate::graph::TrajectorySeries;
use crate::harmony::{update_harmony, FocusHint, HarmonyAnalyzer, HarmonyUpdate, OrbitTransition};
use crate::physics::{physics_step, semi_implicit_euler_step, PositionHistory};
use crate::prediction::{predict, predict_trajectories, CollisionForecast, Prediction};
use crate::rng::{fresh_seed, SeededRandom};
use crate::types::{Bodies, Body, BodyPair, PAIR_COUNT};

/// Ranges for random initial conditions.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnConfig {
    /// Each position axis is drawn from `[-position_range, position_range)`.
    pub position_range: f64,
    /// Each velocity axis is drawn from `[-velocity_range, velocity_range)`.
    pub velocity_range: f64,
    pub mass: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            position_range: 10.0,
            velocity_range: 1.0,
            mass: 1.0,
        }
    }
}

/// Draw three bodies from `rng`.
///
/// For each body in turn the position is drawn, then the velocity. Changing
/// this order changes every seeded episode.
pub fn spawn_bodies(rng: &mut SeededRandom, config: &SpawnConfig) -> Bodies {
    std::array::from_fn(|id| {
        let position = rng.random_vector3(config.position_range);
        let velocity = rng.random_vector3(config.velocity_range);
        Body::new(id, position, velocity, config.mass)
    })
}

/// Tick counter and simulated time of the current episode.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulationClock {
    /// Completed frames.
    pub tick: u64,
    /// Simulated seconds.
    pub time: f64,
}

/// Result of stepping a [`SimulationState`] through a whole frame.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// The frame completed. Carries the harmony update on sampled ticks.
    Continued(Option<HarmonyUpdate>),
    /// Two bodies touched; the frame stopped after integration.
    Collided(CollisionEvent),
}

/// All live state of one episode.
#[derive(Clone, Debug)]
pub struct SimulationState {
    config: EngineConfig,
    bodies: Bodies,
    history: PositionHistory,
    clock: SimulationClock,
    prediction: Prediction,
    harmony: HarmonyAnalyzer,
    series: TrajectorySeries,
}

impl SimulationState {
    /// Spawn a fresh episode from `rng`.
    pub fn spawn(rng: &mut SeededRandom, config: &EngineConfig) -> Self {
        Self::from_bodies(spawn_bodies(rng, &config.spawn), config)
    }

    /// Start an episode from explicit bodies. The initial prediction is
    /// computed immediately.
    pub fn from_bodies(bodies: Bodies, config: &EngineConfig) -> Self {
        let prediction = predict(&bodies, &config.physics, &config.prediction);
        Self {
            config: config.clone(),
            bodies,
            history: PositionHistory::new(config.physics.history_capacity),
            clock: SimulationClock::default(),
            prediction,
            harmony: HarmonyAnalyzer::new(config.harmony.clone()),
            series: TrajectorySeries::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bodies(&self) -> &Bodies {
        &self.bodies
    }

    pub fn clock(&self) -> SimulationClock {
        self.clock
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    pub fn prediction(&self) -> &Prediction {
        &self.prediction
    }

    pub fn harmony(&self) -> &HarmonyAnalyzer {
        &self.harmony
    }

    pub fn series(&self) -> &TrajectorySeries {
        &self.series
    }

    /// Advance the live bodies one timestep and record their positions.
    pub fn integrate(&mut self) {
        semi_implicit_euler_step(&mut self.bodies, &self.config.physics);
        self.history.record(&self.bodies);
    }

    pub fn detect_collision(&self) -> Option<CollisionEvent> {
        detect_collision(
            &self.bodies,
            self.config.prediction.collision_distance,
            self.clock.time,
        )
    }

    /// Replace the prediction with one derived from the current bodies.
    pub fn refresh_prediction(&mut self) {
        self.prediction = predict(&self.bodies, &self.config.physics, &self.config.prediction);
    }

    /// Sample and rescore harmony if this tick is a sampling tick.
    pub fn update_harmony(&mut self) -> Option<HarmonyUpdate> {
        self.harmony.observe(
            self.clock.tick,
            &self.bodies,
            &self.prediction,
            self.config.physics.gravity,
            self.clock.time,
        )
    }

    /// Close the frame: advance the clock and extend the graph series.
    pub fn advance_clock(&mut self) {
        self.clock.tick += 1;
        self.clock.time += self.config.physics.time_step;
        self.series
            .record(&self.bodies, self.clock.time, self.config.graph.max_points_per_body);
    }

    /// Run one whole frame without any episode bookkeeping.
    pub fn step(&mut self) -> StepOutcome {
        self.integrate();
        if let Some(event) = self.detect_collision() {
            return StepOutcome::Collided(event);
        }
        self.refresh_prediction();
        let update = self.update_harmony();
        self.advance_clock();
        StepOutcome::Continued(update)
    }

    /// Points a prediction line for `body` shows at a time `offset`.
    ///
    /// Negative offsets start from the position that far in the past.
    pub fn display_path(&self, body: usize, offset: f64) -> Vec<DVec3> {
        let past = if offset < 0.0 {
            self.history
                .position_at_offset(body, offset, self.config.physics.time_step)
        } else {
            None
        };
        self.prediction
            .trajectory
            .path_with_offset(body, self.bodies[body].position, past, offset)
    }
}

/// Outputs of the most recent frame, for rendering and UI collaborators.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub seed: u32,
    pub tick: u64,
    pub time: f64,
    pub harmony: [f64; PAIR_COUNT],
    pub orbiting: Vec<BodyPair>,
    pub forecasts: Vec<CollisionForecast>,
    pub focus_hints: Vec<FocusHint>,
    pub transitions: Vec<OrbitTransition>,
    /// Set when this frame ended an episode.
    pub collision: Option<CollisionEvent>,
}

/// Plugin running the three-body engine inside a Bevy app.
#[derive(Clone, Debug, Default)]
pub struct SimulationPlugin {
    pub config: EngineConfig,
    /// Seed of the first episode. A fresh one is drawn when unset.
    pub seed: Option<u32>,
    /// JSON file the longest runs are persisted to.
    pub history_path: Option<PathBuf>,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let seed = self.seed.unwrap_or_else(fresh_seed);
        let mut manager = RunManager::new(self.config.clone(), seed);
        if let Some(path) = &self.history_path {
            manager = manager.with_store(Box::new(JsonFileStore::new(path.clone())));
        }

        app.add_message::<EpisodeCommand>()
            .insert_resource(manager)
            .init_resource::<FrameReport>()
            .add_systems(
                Update,
                (
                    apply_episode_commands,
                    physics_step,
                    check_collisions,
                    predict_trajectories,
                    update_harmony,
                    finish_frame,
                )
                    .chain(),
            );
    }
}
