//! Jump input: debounce gate and cross-thread intent queue

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::clock::GameClock;
use super::state::{GameState, Side};
use crate::Millis;

/// Maximum buffered intents before new ones are dropped
pub const INPUT_QUEUE_CAPACITY: usize = 16;

/// Snapshot of the match fields the gate checks
#[derive(Debug, Clone, Copy)]
pub struct GateContext {
    pub active: bool,
    pub state: GameState,
    pub respawning: bool,
    pub next_platform: usize,
    pub platform_count: usize,
}

/// Validates and debounces jump requests
#[derive(Debug, Clone)]
pub struct InputGate {
    input_delay_ms: Millis,
    last_jump_at: Option<Millis>,
    /// Input stays closed until this time (post-respawn cooldown)
    closed_until: Millis,
}

impl InputGate {
    pub fn new(input_delay_ms: Millis) -> Self {
        Self {
            input_delay_ms,
            last_jump_at: None,
            closed_until: 0,
        }
    }

    /// Forget debounce history; the next valid jump is accepted immediately
    pub fn reset(&mut self) {
        self.last_jump_at = None;
        self.closed_until = 0;
    }

    /// Keep input closed for `duration_ms` from `now`
    pub fn close_for(&mut self, now: Millis, duration_ms: Millis) {
        self.closed_until = now.saturating_add(duration_ms);
    }

    pub fn last_jump_at(&self) -> Option<Millis> {
        self.last_jump_at
    }

    /// Accept or silently reject a jump. Starts the clock on the first accepted jump.
    pub fn accept(&mut self, ctx: &GateContext, clock: &mut GameClock, now: Millis) -> bool {
        if !ctx.active || ctx.state != GameState::Playing || ctx.respawning {
            return false;
        }
        if now < self.closed_until {
            return false;
        }
        if self
            .last_jump_at
            .is_some_and(|last| now.saturating_sub(last) < self.input_delay_ms)
        {
            return false;
        }
        if ctx.next_platform >= ctx.platform_count {
            return false;
        }

        self.last_jump_at = Some(now);
        clock.start(now);
        true
    }
}

/// Cloneable handle for pushing jump intents from an input thread.
///
/// Intents are applied on the tick thread at the start of the next update.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    intents: Arc<Mutex<VecDeque<Side>>>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a jump; returns false if the queue is full and the intent was dropped
    pub fn push(&self, side: Side) -> bool {
        let mut intents = self.intents.lock();
        if intents.len() >= INPUT_QUEUE_CAPACITY {
            log::warn!("Input queue full, dropping {:?} jump", side);
            return false;
        }
        intents.push_back(side);
        true
    }

    pub fn jump_left(&self) -> bool {
        self.push(Side::Left)
    }

    pub fn jump_right(&self) -> bool {
        self.push(Side::Right)
    }

    /// Take every queued intent in arrival order
    pub fn take_all(&self) -> Vec<Side> {
        self.intents.lock().drain(..).collect()
    }

    pub fn clear(&self) {
        self.intents.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.intents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.lock().is_empty()
    }
}
