//! Rolling per-pair orbital samples.

use std::collections::VecDeque;

use bevy::math::DVec3;

use crate::types::Body;

/// Relative orbital state of one body pair at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrbitalSample {
    /// Separation between the two bodies.
    pub distance: f64,
    /// Magnitude of `r × v` for the relative position and velocity.
    pub angular_momentum: f64,
    /// `0.5 |v_rel|² − G m_a m_b / r`.
    pub orbital_energy: f64,
    /// Simulation time the sample was taken at.
    pub time: f64,
}

impl OrbitalSample {
    /// Build a sample from relative position and velocity (`a − b`).
    pub fn from_relative(
        relative_position: DVec3,
        relative_velocity: DVec3,
        masses: (f64, f64),
        gravity: f64,
        time: f64,
    ) -> Self {
        let distance = relative_position.length();
        let potential = if distance > 0.0 {
            gravity * masses.0 * masses.1 / distance
        } else {
            0.0
        };

        Self {
            distance,
            angular_momentum: relative_position.cross(relative_velocity).length(),
            orbital_energy: 0.5 * relative_velocity.length_squared() - potential,
            time,
        }
    }

    /// Sample the live relative state of two bodies.
    pub fn between(a: &Body, b: &Body, gravity: f64, time: f64) -> Self {
        Self::from_relative(
            a.position - b.position,
            a.velocity - b.velocity,
            (a.mass, b.mass),
            gravity,
            time,
        )
    }
}

/// Bounded history of samples for one pair. Oldest samples are evicted first.
#[derive(Clone, Debug)]
pub struct OrbitHistory {
    samples: VecDeque<OrbitalSample>,
    capacity: usize,
}

impl OrbitHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: OrbitalSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&OrbitalSample> {
        self.samples.back()
    }

    /// Samples oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &OrbitalSample> {
        self.samples.iter()
    }

    /// The most recent `window` samples, oldest first.
    pub fn recent(&self, window: usize) -> Vec<OrbitalSample> {
        let skip = self.samples.len().saturating_sub(window);
        self.samples.iter().skip(skip).copied().collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
