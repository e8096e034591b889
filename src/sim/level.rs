//! Level director: level number -> platform count and memory preview time

use crate::Millis;
use crate::tuning::LevelTuning;

/// Immutable per-level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelConfig {
    pub level: u32,
    /// Start + playable + finish (>= 3)
    pub total_platforms: u32,
    pub memory_display_ms: Millis,
}

impl LevelConfig {
    /// Platforms that can break
    pub fn playable_platforms(&self) -> u32 {
        self.total_platforms - 2
    }

    pub fn memory_display_seconds(&self) -> f32 {
        self.memory_display_ms as f32 / 1000.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct LevelDirector {
    tuning: LevelTuning,
}

impl LevelDirector {
    pub fn new(tuning: LevelTuning) -> Self {
        let normalized = tuning.normalized();
        if normalized != tuning {
            log::warn!("Level tuning adjusted so platform tiers never shrink: {:?}", normalized);
        }
        Self { tuning: normalized }
    }

    pub fn tuning(&self) -> &LevelTuning {
        &self.tuning
    }

    /// Playable platforms before the total-platform cap
    fn raw_playable(&self, level: u32) -> u32 {
        let t = &self.tuning;
        if level < t.tier_two_start {
            t.tier_one_playable
        } else if level < t.tier_three_start {
            t.tier_two_playable
        } else {
            t.tier_three_base_playable
                .saturating_add((level - t.tier_three_start) / t.tier_step.max(1))
        }
    }

    pub fn total_platforms(&self, level: u32) -> u32 {
        let level = level.max(1);
        self.raw_playable(level)
            .saturating_add(2)
            .clamp(3, self.tuning.max_total_platforms.max(3))
    }

    pub fn memory_time_ms(&self, level: u32) -> Millis {
        let t = &self.tuning;
        let level = level.max(1);

        let steep_levels = (level - 1).min(t.steep_decay_until.saturating_sub(1));
        let shallow_levels = level.saturating_sub(t.steep_decay_until);
        let decay = t
            .steep_decay_ms
            .saturating_mul(steep_levels as Millis)
            .saturating_add(t.shallow_decay_ms.saturating_mul(shallow_levels as Millis));

        // One bonus per platform gained since level 1
        let gained = self.total_platforms(level).saturating_sub(self.total_platforms(1));
        let bonus = t.tier_bonus_ms.saturating_mul(gained as Millis);

        t.memory_base_ms
            .saturating_add(bonus)
            .saturating_sub(decay)
            .max(t.memory_floor_ms)
    }

    pub fn level_config(&self, level: u32) -> LevelConfig {
        let level = level.max(1);
        LevelConfig {
            level,
            total_platforms: self.total_platforms(level),
            memory_display_ms: self.memory_time_ms(level),
        }
    }
}
