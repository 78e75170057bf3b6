//! Episode lifecycle: seeding, resets, run timing and run history.
//!
//! The [`RunManager`] resource owns the RNG and the live [`SimulationState`].
//! An episode runs until two bodies collide or a collaborator asks for a
//! reset. Either way the attempt is archived and logged, and a new state is
//! spawned in one step, so consumers never observe a half-reset episode.

mod history;
mod store;

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use bevy::prelude::*;

pub use history::{EndReason, RunLog, RunLogConfig, RunRecord};
pub use store::{JsonFileStore, MemoryStore, RunHistoryStore, StoreError};

use crate::config::EngineConfig;
use crate::graph::TrajectoryArchive;
use crate::rng::{fresh_seed, parse_seed, SeedError, SeededRandom};
use crate::simulation::{FrameReport, SimulationState};

/// Request from a collaborator, applied at the start of the next frame.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeCommand {
    /// End the current attempt. With `new_seed` unset the same seed replays.
    Reset { new_seed: bool },
    /// End the current attempt and start over from `seed`.
    RunWithSeed(u32),
}

/// Snapshot of the attempt in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurrentAttempt {
    pub seed: u32,
    /// Wall-clock seconds since the attempt started.
    pub elapsed_secs: f64,
    pub simulated_secs: f64,
}

#[derive(Clone, Copy, Debug)]
struct Attempt {
    seed: u32,
    started: Instant,
}

impl Attempt {
    fn start(seed: u32) -> Self {
        Self {
            seed,
            started: Instant::now(),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Owner of the live simulation and everything that outlives one episode.
#[derive(Resource)]
pub struct RunManager {
    config: EngineConfig,
    rng: SeededRandom,
    state: SimulationState,
    attempt: Attempt,
    log: RunLog,
    archive: TrajectoryArchive,
    store: Option<Box<dyn RunHistoryStore>>,
    report: FrameReport,
    interrupted: bool,
}

impl RunManager {
    /// Start the first episode from `seed`.
    pub fn new(config: EngineConfig, seed: u32) -> Self {
        let mut rng = SeededRandom::new(seed);
        let state = SimulationState::spawn(&mut rng, &config);
        info!("Simulation starting with seed: {}", rng.seed());

        Self {
            log: RunLog::new(config.run_log.clone()),
            attempt: Attempt::start(rng.seed()),
            config,
            rng,
            state,
            archive: TrajectoryArchive::default(),
            store: None,
            report: FrameReport::default(),
            interrupted: false,
        }
    }

    /// Persist the longest runs to `store`, loading what it already holds.
    ///
    /// A store that fails to load is still used for saving; the session
    /// starts with an empty list.
    pub fn with_store(mut self, store: Box<dyn RunHistoryStore>) -> Self {
        match store.load() {
            Ok(records) => {
                debug!("Loaded {} longest runs", records.len());
                self.log = RunLog::new(self.config.run_log.clone()).with_longest(records);
            }
            Err(err) => warn!("Failed to load longest runs: {}", err),
        }
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Seed of the current episode.
    pub fn seed(&self) -> u32 {
        self.rng.seed()
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    pub fn archive(&self) -> &TrajectoryArchive {
        &self.archive
    }

    pub fn current_attempt(&self) -> CurrentAttempt {
        CurrentAttempt {
            seed: self.attempt.seed,
            elapsed_secs: self.attempt.started.elapsed().as_secs_f64(),
            simulated_secs: self.state.clock().time,
        }
    }

    /// End the current attempt as a manual reset and start a new one.
    pub fn reset_episode(&mut self, new_seed: bool) {
        self.end_attempt(EndReason::ManualReset);
        self.restart(new_seed);
    }

    /// Replay from `seed`. Seeds at or above `MAX_SEED` wrap.
    pub fn run_with_seed(&mut self, seed: u32) {
        self.rng = SeededRandom::new(seed);
        info!("Running with seed: {}", self.rng.seed());
        self.end_attempt(EndReason::ManualReset);
        self.restart(false);
    }

    /// Replay from a seed typed by a user.
    ///
    /// Invalid text leaves the current episode untouched.
    pub fn run_with_seed_text(&mut self, text: &str) -> Result<u32, SeedError> {
        let seed = parse_seed(text).inspect_err(|err| warn!("Rejected seed input: {}", err))?;
        self.run_with_seed(seed);
        Ok(self.rng.seed())
    }

    fn end_attempt(&mut self, reason: EndReason) {
        self.archive
            .archive(self.attempt.seed, self.state.series(), &self.config.graph);

        let elapsed = self.attempt.started.elapsed().as_secs_f64();
        let record = RunRecord {
            timestamp: unix_now(),
            duration_secs: (elapsed * 100.0).round() / 100.0,
            simulated_secs: self.state.clock().time,
            reason,
            seed: self.attempt.seed,
        };
        info!(
            "Episode ended: {} after {:.2}s (seed {})",
            reason, record.duration_secs, record.seed
        );

        if self.log.record(record) {
            self.persist();
        }
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(err) = store.save(self.log.longest()) {
            warn!("Failed to save longest runs: {}", err);
        }
    }

    fn restart(&mut self, new_seed: bool) {
        if new_seed {
            self.rng = SeededRandom::new(fresh_seed());
        } else {
            self.rng.reset();
        }
        self.state = SimulationState::spawn(&mut self.rng, &self.config);
        self.attempt = Attempt::start(self.rng.seed());
        info!("Simulation starting with seed: {}", self.rng.seed());
    }

    pub fn apply_command(&mut self, command: EpisodeCommand) {
        match command {
            EpisodeCommand::Reset { new_seed } => self.reset_episode(new_seed),
            EpisodeCommand::RunWithSeed(seed) => self.run_with_seed(seed),
        }
    }

    pub fn integrate(&mut self) {
        if !self.interrupted {
            self.state.integrate();
        }
    }

    /// End the episode if two live bodies touch.
    ///
    /// The new episode is spawned immediately with its initial prediction;
    /// the remaining stages of this frame are skipped.
    pub fn check_collision(&mut self) {
        if self.interrupted {
            return;
        }
        let Some(event) = self.state.detect_collision() else {
            return;
        };

        info!(
            "Collision between {} at {:.2}s (distance {:.3})",
            event.pair, event.time, event.distance
        );
        let reason = EndReason::Collision {
            a: event.pair.first(),
            b: event.pair.second(),
        };
        self.report.collision = Some(event);
        self.end_attempt(reason);
        self.restart(true);
        self.interrupted = true;
    }

    pub fn predict(&mut self) {
        if !self.interrupted {
            self.state.refresh_prediction();
        }
    }

    pub fn update_harmony(&mut self) {
        if self.interrupted {
            return;
        }
        if let Some(update) = self.state.update_harmony() {
            self.report.focus_hints.extend(update.focus_hints);
            self.report.transitions.extend(update.transitions);
        }
    }

    /// Close the frame and return what it produced.
    pub fn finish_frame(&mut self) -> FrameReport {
        if !self.interrupted {
            self.state.advance_clock();
        }
        self.interrupted = false;

        let clock = self.state.clock();
        let harmony = self.state.harmony();
        FrameReport {
            seed: self.rng.seed(),
            tick: clock.tick,
            time: clock.time,
            harmony: harmony.harmony_values(),
            orbiting: harmony.orbiting_pairs(),
            forecasts: self.state.prediction().forecasts.clone(),
            ..std::mem::take(&mut self.report)
        }
    }

    /// Run every simulation stage of one frame in order.
    pub fn advance_frame(&mut self) -> FrameReport {
        self.integrate();
        self.check_collision();
        self.predict();
        self.update_harmony();
        self.finish_frame()
    }
}

/// Apply commands written since the previous frame, in arrival order.
pub fn apply_episode_commands(
    mut commands: MessageReader<EpisodeCommand>,
    mut manager: ResMut<RunManager>,
) {
    for command in commands.read() {
        manager.apply_command(*command);
    }
}

/// Publish this frame's outputs.
pub fn finish_frame(mut manager: ResMut<RunManager>, mut report: ResMut<FrameReport>) {
    *report = manager.finish_frame();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BodyPair;

    fn manager(seed: u32) -> RunManager {
        RunManager::new(EngineConfig::default(), seed)
    }

    #[test]
    fn test_run_with_seed_replays_bodies() {
        let mut first = manager(5);
        let spawned = first.state().bodies().clone();
        for _ in 0..5 {
            first.advance_frame();
        }

        first.run_with_seed(5);
        assert_eq!(first.state().bodies(), &spawned);
        assert_eq!(first.state().clock().tick, 0);
        assert_eq!(first.seed(), 5);
    }

    #[test]
    fn test_run_with_seed_wraps() {
        let mut manager = manager(1);
        manager.run_with_seed(1_000_042);
        assert_eq!(manager.seed(), 42);
    }

    #[test]
    fn test_manual_reset_logs_attempt() {
        let mut manager = manager(9);
        manager.advance_frame();
        manager.reset_episode(false);

        let record = manager.log().recent().next().cloned().unwrap();
        assert_eq!(record.reason, EndReason::ManualReset);
        assert_eq!(record.seed, 9);
        assert!(record.simulated_secs > 0.0);
        assert_eq!(manager.seed(), 9);
        assert_eq!(manager.archive().len(), 1);
    }

    #[test]
    fn test_invalid_seed_text_keeps_episode() {
        let mut manager = manager(77);
        manager.advance_frame();
        let before = manager.state().bodies().clone();

        assert!(manager.run_with_seed_text("abc").is_err());
        assert_eq!(manager.seed(), 77);
        assert_eq!(manager.state().bodies(), &before);
        assert_eq!(manager.log().recent().count(), 0);

        assert_eq!(manager.run_with_seed_text(" 1234 "), Ok(1234));
        assert_eq!(manager.seed(), 1234);
    }

    #[test]
    fn test_apply_command() {
        let mut manager = manager(3);
        manager.advance_frame();

        manager.apply_command(EpisodeCommand::RunWithSeed(8));
        let report = manager.advance_frame();
        assert_eq!(report.seed, 8);
        assert_eq!(report.tick, 1);

        manager.apply_command(EpisodeCommand::Reset { new_seed: false });
        assert_eq!(manager.seed(), 8);
        assert_eq!(manager.state().clock().tick, 0);
        assert_eq!(manager.log().recent().count(), 2);
    }

    #[test]
    fn test_collision_ends_episode_and_skips_frame() {
        let config = EngineConfig::default();
        let mut manager = RunManager::new(config.clone(), 11);
        manager.state = SimulationState::from_bodies(crate::test_utils::fixtures::resting_pair(2.0), &config);

        let report = manager.advance_frame();

        let collision = report.collision.expect("collision reported");
        assert_eq!(collision.pair, BodyPair::ALL[0]);
        assert_eq!(report.tick, 0);
        assert_eq!(report.time, 0.0);
        assert_eq!(
            manager.log().recent().next().map(|r| r.reason),
            Some(EndReason::Collision { a: 0, b: 1 })
        );
        // The replacement episode is ready to run.
        assert_eq!(manager.state().clock().tick, 0);
        assert_eq!(manager.state().prediction().trajectory.len(), config.prediction.steps);
        assert_eq!(manager.archive().len(), 0, "nothing was recorded before the collision");
    }

    #[test]
    fn test_longest_runs_persisted() {
        let store = MemoryStore::default();
        let mut manager = manager(4).with_store(Box::new(store.clone()));

        std::thread::sleep(std::time::Duration::from_millis(20));
        manager.reset_episode(true);

        let saved = store.records();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].seed, 4);
        assert_eq!(manager.log().longest(), saved.as_slice());
    }

    #[test]
    fn test_store_history_is_loaded() {
        let previous = RunRecord {
            timestamp: 10,
            duration_secs: 99.0,
            simulated_secs: 50.0,
            reason: EndReason::ManualReset,
            seed: 123,
        };
        let store = MemoryStore::with_records(vec![previous.clone()]);
        let manager = manager(4).with_store(Box::new(store));
        assert_eq!(manager.log().rank(1), Some(&previous));
    }

    #[test]
    fn test_current_attempt() {
        let mut manager = manager(21);
        for _ in 0..4 {
            manager.advance_frame();
        }
        let attempt = manager.current_attempt();
        assert_eq!(attempt.seed, 21);
        approx::assert_relative_eq!(attempt.simulated_secs, 0.2, epsilon = 1e-9);
        assert!(attempt.elapsed_secs >= 0.0);
    }
}
