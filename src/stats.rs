//! Per-run progress tracking
//!
//! Lives only as long as the process; nothing is persisted.

use serde::{Deserialize, Serialize};

use crate::Millis;

/// Level progress and best completion time for the current run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Level being played (1-indexed)
    pub current_level: u32,
    /// Highest level ever reached this run (>= current_level)
    pub highest_level_reached: u32,
    /// Fastest level completion, if any level was won
    pub best_time_ms: Option<Millis>,
    /// Levels won
    pub wins: u32,
    /// Levels failed
    pub falls: u32,
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            current_level: 1,
            highest_level_reached: 1,
            best_time_ms: None,
            wins: 0,
            falls: 0,
        }
    }

    /// Record a completed level and advance to the next one.
    /// Returns true if the completion time is a new best.
    pub fn record_win(&mut self, elapsed_ms: Millis) -> bool {
        self.wins += 1;
        self.current_level += 1;
        self.highest_level_reached = self.highest_level_reached.max(self.current_level);

        let is_best = self.best_time_ms.is_none_or(|best| elapsed_ms < best);
        if is_best {
            self.best_time_ms = Some(elapsed_ms);
        }
        is_best
    }

    /// Record a failed level; regresses one level, never below the first
    pub fn record_fall(&mut self) {
        self.falls += 1;
        self.current_level = self.current_level.saturating_sub(1).max(1);
    }

    /// Best time in seconds (0 when nothing has been won yet)
    pub fn best_time_seconds(&self) -> f64 {
        self.best_time_ms.map(|ms| ms as f64 / 1000.0).unwrap_or(0.0)
    }
}
