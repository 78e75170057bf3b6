//! Run records and the recent / longest run lists.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Why an episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Bodies `a` and `b` (zero-based) touched.
    Collision { a: usize, b: usize },
    ManualReset,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collision { a, b } => write!(f, "Collision between Body {} and Body {}", a + 1, b + 1),
            Self::ManualReset => write!(f, "Manual reset"),
        }
    }
}

/// One finished episode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unix time the episode ended, in seconds.
    pub timestamp: u64,
    /// Wall-clock duration in seconds, rounded to hundredths.
    pub duration_secs: f64,
    /// Simulated time reached.
    pub simulated_secs: f64,
    pub reason: EndReason,
    pub seed: u32,
}

/// Sizes of the run lists.
#[derive(Clone, Debug, PartialEq)]
pub struct RunLogConfig {
    pub max_recent: usize,
    pub max_longest: usize,
}

impl Default for RunLogConfig {
    fn default() -> Self {
        Self {
            max_recent: 9,
            max_longest: 10,
        }
    }
}

/// Most recent runs (newest first) and longest runs (longest first).
#[derive(Clone, Debug, Default)]
pub struct RunLog {
    config: RunLogConfig,
    recent: VecDeque<RunRecord>,
    longest: Vec<RunRecord>,
}

impl RunLog {
    pub fn new(config: RunLogConfig) -> Self {
        Self {
            config,
            recent: VecDeque::new(),
            longest: Vec::new(),
        }
    }

    /// Seed the longest-runs list, typically from persisted history.
    pub fn with_longest(mut self, records: Vec<RunRecord>) -> Self {
        self.longest = records
            .into_iter()
            .filter(|r| r.duration_secs > 0.0)
            .collect();
        self.sort_longest();
        self
    }

    /// Add a finished run.
    ///
    /// Returns `true` when the longest-runs list was touched and should be
    /// persisted.
    pub fn record(&mut self, record: RunRecord) -> bool {
        self.recent.push_front(record.clone());
        self.recent.truncate(self.config.max_recent);

        if record.duration_secs > 0.0 {
            self.longest.push(record);
            self.sort_longest();
            true
        } else {
            false
        }
    }

    fn sort_longest(&mut self) {
        // Stable sort keeps earlier runs ahead of later ones of equal length.
        self.longest
            .sort_by(|a, b| b.duration_secs.total_cmp(&a.duration_secs));
        self.longest.truncate(self.config.max_longest);
    }

    /// Recent runs, newest first.
    pub fn recent(&self) -> impl Iterator<Item = &RunRecord> {
        self.recent.iter()
    }

    /// Longest runs, longest first.
    pub fn longest(&self) -> &[RunRecord] {
        &self.longest
    }

    /// Run at 1-based `rank` in the longest-runs list.
    pub fn rank(&self, rank: usize) -> Option<&RunRecord> {
        rank.checked_sub(1).and_then(|i| self.longest.get(i))
    }
}
