//! Data-driven game balance
//!
//! Every timing and difficulty constant lives here so levels can be
//! re-balanced from JSON without touching the simulation.

use serde::{Deserialize, Serialize};

use crate::Millis;

/// Difficulty curve constants consumed by the level director
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelTuning {
    /// First level of the second platform tier
    pub tier_two_start: u32,
    /// First level of the open-ended tier
    pub tier_three_start: u32,
    /// Levels per extra platform inside the open-ended tier
    pub tier_step: u32,
    /// Playable platforms in the first tier
    pub tier_one_playable: u32,
    /// Playable platforms in the second tier
    pub tier_two_playable: u32,
    /// Playable platforms at the start of the open-ended tier
    pub tier_three_base_playable: u32,
    /// Cap on start + playable + finish
    pub max_total_platforms: u32,

    /// Memory preview at level 1
    pub memory_base_ms: Millis,
    /// Per-level decay through `steep_decay_until`
    pub steep_decay_ms: Millis,
    /// Last level of the steep decay band
    pub steep_decay_until: u32,
    /// Per-level decay after the steep band
    pub shallow_decay_ms: Millis,
    /// Added for every platform-count increase since level 1
    pub tier_bonus_ms: Millis,
    /// Memory preview never drops below this
    pub memory_floor_ms: Millis,
}

impl Default for LevelTuning {
    fn default() -> Self {
        Self {
            tier_two_start: 20,
            tier_three_start: 40,
            tier_step: 20,
            tier_one_playable: 3,
            tier_two_playable: 4,
            tier_three_base_playable: 5,
            max_total_platforms: 12,

            memory_base_ms: 5000,
            steep_decay_ms: 80,
            steep_decay_until: 50,
            shallow_decay_ms: 40,
            tier_bonus_ms: 500,
            memory_floor_ms: 1000,
        }
    }
}

impl LevelTuning {
    /// Tiers that never shrink: at least one playable platform, each tier
    /// at least as long as the one before, and a non-zero tier step
    pub fn normalized(&self) -> Self {
        let tier_one_playable = self.tier_one_playable.max(1);
        let tier_two_playable = self.tier_two_playable.max(tier_one_playable);
        Self {
            tier_one_playable,
            tier_two_playable,
            tier_three_base_playable: self.tier_three_base_playable.max(tier_two_playable),
            tier_step: self.tier_step.max(1),
            ..self.clone()
        }
    }
}

/// Match timing, feel, and difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Debounce window between two accepted jumps
    pub input_delay_ms: Millis,
    /// Jump accepted -> touchdown (land effect, or the pane breaks on a wrong jump)
    pub landing_delay_ms: Millis,
    /// Pane breaks -> level fails and reinitializes
    pub respawn_delay_ms: Millis,
    /// Input stays closed this long after a failed level reinitializes
    pub post_respawn_cooldown_ms: Millis,

    /// Shake applied when landing on a safe pane
    pub land_shake: f32,
    /// Shake applied when a pane breaks
    pub break_shake: f32,
    /// Shake decay (units/s)
    pub shake_decay_rate: f32,
    /// Per-tick delta clamp (seconds)
    pub max_delta_time: f32,

    /// Show the correct path before each level
    pub memory_phase_enabled: bool,
    /// Hints fade out over the last part of the memory phase
    pub memory_fade_ms: Millis,

    pub levels: LevelTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            input_delay_ms: 200,
            landing_delay_ms: 300,
            respawn_delay_ms: 200,
            post_respawn_cooldown_ms: 250,

            land_shake: 0.15,
            break_shake: 0.25,
            shake_decay_rate: 3.0,
            max_delta_time: 0.05,

            memory_phase_enabled: true,
            memory_fade_ms: 500,

            levels: LevelTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Self = serde_json::from_str(json)?;
        log::info!(
            "Loaded tuning (input delay {}ms, memory phase {})",
            tuning.input_delay_ms,
            if tuning.memory_phase_enabled { "on" } else { "off" }
        );
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Tuning without the memory preview (the classic single-level variant)
    pub fn without_memory_phase() -> Self {
        Self {
            memory_phase_enabled: false,
            ..Self::default()
        }
    }
}
