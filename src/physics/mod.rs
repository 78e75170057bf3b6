//! Physics simulation for the three gravitating bodies.
//!
//! This module provides pairwise gravity and the fixed-step semi-implicit
//! Euler integrator shared by the live simulation and the trajectory
//! predictor, plus the bounded per-body position history used for
//! past-time-offset lookups.

mod gravity;
mod integrator;

#[cfg(test)]
mod proptest_physics;

use std::collections::VecDeque;

use bevy::math::DVec3;
use bevy::prelude::*;

pub use gravity::{compute_acceleration, compute_accelerations};
pub use integrator::{semi_implicit_euler_step, PhysicsConfig};

use crate::episode::RunManager;
use crate::types::{Bodies, BODY_COUNT};

/// Bounded ring buffer of past positions for each body.
///
/// The newest position is at the back; once `capacity` is reached the oldest
/// entry is evicted.
#[derive(Clone, Debug)]
pub struct PositionHistory {
    positions: [VecDeque<DVec3>; BODY_COUNT],
    capacity: usize,
}

impl PositionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: std::array::from_fn(|_| VecDeque::new()),
            capacity,
        }
    }

    /// Append the current position of every body.
    pub fn record(&mut self, bodies: &Bodies) {
        for (history, body) in self.positions.iter_mut().zip(bodies) {
            history.push_back(body.position);
            while history.len() > self.capacity {
                history.pop_front();
            }
        }
    }

    /// Number of positions stored for `body`.
    pub fn len(&self, body: usize) -> usize {
        self.positions[body].len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.iter().all(VecDeque::is_empty)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently recorded position of `body`.
    pub fn latest(&self, body: usize) -> Option<DVec3> {
        self.positions[body].back().copied()
    }

    /// Position of `body` roughly `seconds_ago` simulated seconds in the past.
    ///
    /// Looks `floor(seconds_ago / time_step)` entries back from the newest.
    /// Returns `None` if the history does not reach that far.
    pub fn position_at_offset(&self, body: usize, seconds_ago: f64, time_step: f64) -> Option<DVec3> {
        let history = &self.positions[body];
        let steps_back = (seconds_ago.abs() / time_step).floor() as usize;
        if history.len() > steps_back {
            history.get(history.len() - 1 - steps_back).copied()
        } else {
            None
        }
    }

    /// Iterate over the stored positions of `body`, oldest first.
    pub fn iter(&self, body: usize) -> impl Iterator<Item = &DVec3> {
        self.positions[body].iter()
    }

    pub fn clear(&mut self) {
        for history in &mut self.positions {
            history.clear();
        }
    }
}

/// Advance the live bodies by one fixed timestep.
///
/// First stage of the frame pipeline; collision checking runs next.
pub fn physics_step(mut manager: ResMut<RunManager>) {
    manager.integrate();
}
