//! Time-series data for the distance-from-origin graph.
//!
//! Each body contributes one `(simulation time, |position|)` point per
//! frame. Series are thinned once they grow past a limit, and the series of
//! finished attempts are kept (thinned further) so a graph view can draw
//! them dimmed behind the current attempt.

use std::collections::VecDeque;

use crate::types::{Bodies, BODY_COUNT};

/// One point on the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GraphPoint {
    pub time: f64,
    /// Distance of the body from the origin.
    pub magnitude: f64,
}

/// Limits for live and archived graph series.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphSettings {
    /// A body's series is thinned once it exceeds this many points.
    pub max_points_per_body: usize,
    /// Points kept per body for an archived attempt.
    pub archive_points: usize,
    /// Archived attempts kept, oldest evicted first.
    pub max_archived_attempts: usize,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            max_points_per_body: 5000,
            archive_points: 1000,
            max_archived_attempts: 10,
        }
    }
}

/// Keep every `ceil(len / max_points)`-th point, starting with the first.
///
/// Returns the input unchanged when it already fits.
pub fn downsample<T: Copy>(points: &[T], max_points: usize) -> Vec<T> {
    if points.len() <= max_points || max_points == 0 {
        return points.to_vec();
    }
    let factor = points.len().div_ceil(max_points);
    points.iter().step_by(factor).copied().collect()
}

/// Graph points for every body over the current attempt.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrajectorySeries {
    points: [Vec<GraphPoint>; BODY_COUNT],
}

impl TrajectorySeries {
    /// Append the current distance from origin of every body.
    pub fn record(&mut self, bodies: &Bodies, time: f64, max_points: usize) {
        for (series, body) in self.points.iter_mut().zip(bodies) {
            series.push(GraphPoint {
                time,
                magnitude: body.position.length(),
            });
            if series.len() > max_points {
                *series = downsample(series, max_points / 2);
            }
        }
    }

    pub fn points(&self, body: usize) -> &[GraphPoint] {
        &self.points[body]
    }

    pub fn is_empty(&self) -> bool {
        self.points.iter().all(Vec::is_empty)
    }

    /// Copy of this series with each body thinned to at most `max_points`.
    pub fn downsampled(&self, max_points: usize) -> Self {
        Self {
            points: std::array::from_fn(|body| downsample(&self.points[body], max_points)),
        }
    }

    pub fn clear(&mut self) {
        for series in &mut self.points {
            series.clear();
        }
    }
}

/// Graph data of a finished attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchivedAttempt {
    pub seed: u32,
    pub series: TrajectorySeries,
}

/// Bounded list of finished attempts, oldest first.
#[derive(Clone, Debug, Default)]
pub struct TrajectoryArchive {
    attempts: VecDeque<ArchivedAttempt>,
}

impl TrajectoryArchive {
    /// Store a thinned copy of `series`. Empty series are ignored.
    pub fn archive(&mut self, seed: u32, series: &TrajectorySeries, settings: &GraphSettings) {
        if series.is_empty() {
            return;
        }
        self.attempts.push_back(ArchivedAttempt {
            seed,
            series: series.downsampled(settings.archive_points),
        });
        while self.attempts.len() > settings.max_archived_attempts {
            self.attempts.pop_front();
        }
    }

    pub fn attempts(&self) -> impl Iterator<Item = &ArchivedAttempt> {
        self.attempts.iter()
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}
