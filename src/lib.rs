//! Harmonia - Three-Body Harmony Simulator
//!
//! A library crate providing the gravitational three-body engine:
//! integration, trajectory prediction, collision detection and orbital
//! harmony scoring, plus a Bevy plugin that runs it frame by frame.

pub mod collision;
pub mod config;
pub mod episode;
pub mod graph;
pub mod harmony;
pub mod physics;
pub mod prediction;
pub mod rng;
pub mod simulation;
pub mod types;

#[cfg(test)]
pub mod test_utils;
