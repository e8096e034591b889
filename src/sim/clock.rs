//! Time sources and the pause-aware match clock

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::state::GameState;
use crate::Millis;

/// Monotonic milliseconds since an arbitrary epoch.
///
/// Must never run backwards for the lifetime of a run.
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> Millis;
}

/// Wall-clock backed source (std `Instant`, monotonic)
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for MonotonicTime {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Manually driven source for tests and headless playback
#[derive(Debug, Default)]
pub struct ManualTime {
    now: AtomicU64,
}

impl ManualTime {
    pub fn new(start_ms: Millis) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: Millis) {
        self.now.fetch_max(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: Millis) -> Millis {
        self.now.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms
    }
}

impl TimeSource for ManualTime {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::SeqCst)
    }
}

/// Pause-aware elapsed time for one level attempt.
///
/// The timer anchors on the first accepted jump, not on level start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameClock {
    game_start: Option<Millis>,
    pause_start: Option<Millis>,
    total_paused: Millis,
    win_time: Option<Millis>,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_started(&self) -> bool {
        self.game_start.is_some()
    }

    /// Anchor the timer (no-op once started)
    pub fn start(&mut self, now: Millis) {
        if self.game_start.is_none() {
            self.game_start = Some(now);
        }
    }

    pub fn pause(&mut self, now: Millis) {
        if self.pause_start.is_none() {
            self.pause_start = Some(now);
        }
    }

    /// Fold the pause into the paused total; returns how long the pause lasted
    pub fn resume(&mut self, now: Millis) -> Millis {
        let Some(paused_at) = self.pause_start.take() else {
            return 0;
        };
        let paused_for = now.saturating_sub(paused_at);
        // Pauses before the first jump never counted toward elapsed time
        if self.game_start.is_some() {
            self.total_paused += paused_for;
        }
        paused_for
    }

    pub fn win(&mut self, now: Millis) {
        self.win_time = Some(now);
    }

    pub fn total_paused(&self) -> Millis {
        self.total_paused
    }

    pub fn elapsed_ms(&self, state: GameState, now: Millis) -> Millis {
        let Some(start) = self.game_start else {
            return 0;
        };
        let end = match state {
            GameState::Menu => return 0,
            GameState::Won => match self.win_time {
                Some(t) => t,
                None => return 0,
            },
            GameState::Paused => match self.pause_start {
                Some(t) => t,
                None => return 0,
            },
            GameState::MemoryPhase | GameState::Playing => now,
        };
        end.saturating_sub(start).saturating_sub(self.total_paused)
    }

    pub fn elapsed_seconds(&self, state: GameState, now: Millis) -> f64 {
        self.elapsed_ms(state, now) as f64 / 1000.0
    }
}
