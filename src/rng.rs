//! Deterministic random number generation for reproducible spawns.
//!
//! All initial conditions are drawn from a 32-bit linear congruential
//! generator (Numerical Recipes constants). Given the same seed and the same
//! call order the sequence is bit-identical, which is what makes
//! "replay this seed" reproduce an episode exactly.

use bevy::math::DVec3;

use crate::types::MAX_SEED;

const LCG_MULTIPLIER: u64 = 1_664_525;
const LCG_INCREMENT: u64 = 1_013_904_223;
const LCG_MODULUS: u64 = 1 << 32;

/// Seeded LCG: `state = (a * state + c) mod 2^32`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRandom {
    initial: u32,
    state: u64,
}

impl SeededRandom {
    /// Create a generator. Seeds at or above `MAX_SEED` wrap.
    pub fn new(seed: u32) -> Self {
        let initial = seed % MAX_SEED;
        Self {
            initial,
            state: initial as u64,
        }
    }

    /// The seed this generator was constructed with.
    pub fn seed(&self) -> u32 {
        self.initial
    }

    /// Restore the generator to its constructed seed.
    pub fn reset(&mut self) {
        self.state = self.initial as u64;
    }

    /// Advance the state and return a value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (LCG_MULTIPLIER * self.state + LCG_INCREMENT) % LCG_MODULUS;
        self.state as f64 / LCG_MODULUS as f64
    }

    /// Uniform value in `[min, max)`.
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Vector with each axis drawn independently from `[-range, range)`.
    ///
    /// Axes are drawn x, then y, then z. This is not a uniform sample of a
    /// sphere; replay depends on keeping it exactly this way.
    pub fn random_vector3(&mut self, range: f64) -> DVec3 {
        let x = self.range(-range, range);
        let y = self.range(-range, range);
        let z = self.range(-range, range);
        DVec3::new(x, y, z)
    }
}

/// Draw a fresh seed in `[0, MAX_SEED)` for a new episode.
pub fn fresh_seed() -> u32 {
    fastrand::u32(0..MAX_SEED)
}

/// Errors produced when parsing a seed typed by a user.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error("seed input is empty")]
    Empty,

    #[error("seed {0:?} is not a non-negative integer")]
    NotANumber(String),
}

/// Parse seed text from a collaborator.
///
/// Values at or above `MAX_SEED` wrap modulo `MAX_SEED`.
pub fn parse_seed(text: &str) -> Result<u32, SeedError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SeedError::Empty);
    }
    let value: u64 = trimmed
        .parse()
        .map_err(|_| SeedError::NotANumber(trimmed.to_string()))?;
    Ok((value % MAX_SEED as u64) as u32)
}
