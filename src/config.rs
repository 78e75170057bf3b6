//! Engine configuration.

use crate::episode::RunLogConfig;
use crate::graph::GraphSettings;
use crate::harmony::HarmonyConfig;
use crate::physics::PhysicsConfig;
use crate::prediction::PredictionSettings;
use crate::simulation::SpawnConfig;

/// Every tunable of the engine in one place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EngineConfig {
    pub physics: PhysicsConfig,
    pub prediction: PredictionSettings,
    pub harmony: HarmonyConfig,
    pub spawn: SpawnConfig,
    pub run_log: RunLogConfig,
    pub graph: GraphSettings,
}
