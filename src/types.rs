//! Core simulation types and constants for the three-body engine.

use std::fmt;

use bevy::math::DVec3;

/// Number of bodies in every episode.
pub const BODY_COUNT: usize = 3;

/// Number of unordered body pairs ({0,1}, {0,2}, {1,2}).
pub const PAIR_COUNT: usize = 3;

/// Seeds are drawn from `[0, MAX_SEED)`.
pub const MAX_SEED: u32 = 1_000_000;

/// Radius of every body (simulation units).
pub const BODY_RADIUS: f64 = 1.0;

/// Separation below which two bodies are touching (sum of radii).
pub const COLLISION_DISTANCE: f64 = 2.0 * BODY_RADIUS;

/// Physical state of one body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Body {
    /// Index of the body, 0..BODY_COUNT.
    pub id: usize,
    pub position: DVec3,
    pub velocity: DVec3,
    /// Acceleration applied during the most recent integration step.
    pub acceleration: DVec3,
    pub mass: f64,
}

impl Body {
    /// Create a body with zero acceleration.
    pub fn new(id: usize, position: DVec3, velocity: DVec3, mass: f64) -> Self {
        Self {
            id,
            position,
            velocity,
            acceleration: DVec3::ZERO,
            mass,
        }
    }
}

/// The full set of live bodies. Exactly three per episode.
pub type Bodies = [Body; BODY_COUNT];

/// An unordered pair of bodies, stored canonically with `first < second`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyPair {
    first: usize,
    second: usize,
}

impl BodyPair {
    /// All pairs in canonical pair-index order.
    pub const ALL: [BodyPair; PAIR_COUNT] = [
        BodyPair { first: 0, second: 1 },
        BodyPair { first: 0, second: 2 },
        BodyPair { first: 1, second: 2 },
    ];

    /// Build a pair from two body indices in either order.
    ///
    /// Returns `None` for identical or out-of-range indices.
    pub fn new(a: usize, b: usize) -> Option<Self> {
        if a == b || a >= BODY_COUNT || b >= BODY_COUNT {
            return None;
        }
        Some(Self {
            first: a.min(b),
            second: a.max(b),
        })
    }

    /// Look up a pair by its canonical index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Canonical pair index: {0,1} → 0, {0,2} → 1, {1,2} → 2.
    pub fn index(self) -> usize {
        self.first + self.second - 1
    }

    pub fn first(self) -> usize {
        self.first
    }

    pub fn second(self) -> usize {
        self.second
    }

    /// Whether `body` is one of the two members.
    pub fn contains(self, body: usize) -> bool {
        self.first == body || self.second == body
    }

    /// Distance between the two members.
    pub fn separation(self, bodies: &Bodies) -> f64 {
        bodies[self.first]
            .position
            .distance(bodies[self.second].position)
    }

    /// Point halfway between the two members.
    pub fn midpoint(self, bodies: &Bodies) -> DVec3 {
        (bodies[self.first].position + bodies[self.second].position) * 0.5
    }
}

impl fmt::Display for BodyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bodies are numbered from 1 for display.
        write!(f, "Body {} and Body {}", self.first + 1, self.second + 1)
    }
}

/// Canonical pair index for two body indices, if they form a valid pair.
pub fn pair_index(a: usize, b: usize) -> Option<usize> {
    BodyPair::new(a, b).map(BodyPair::index)
}
