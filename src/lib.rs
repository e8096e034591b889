//! Glass Bridge - A timed glass-platform skill challenge
//!
//! Core modules:
//! - `sim`: Match-progression engine (state machine, clock, scheduler, levels)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `stats`: Per-run progress and best time

pub mod settings;
pub mod sim;
pub mod stats;
pub mod tuning;

pub use settings::Settings;
pub use sim::{Game, GameState, Side};
pub use stats::RunStats;
pub use tuning::{LevelTuning, Tuning};

/// Milliseconds on the injected monotonic time source
pub type Millis = u64;

/// World layout and motion constants
pub mod consts {
    /// Height of every platform's walking surface
    pub const PLATFORM_Y: f32 = 1.0;
    /// Distance between consecutive platforms along Z
    pub const PLATFORM_Z_SPACING: f32 = 5.0;
    /// Lateral offset of the left/right glass panes from the bridge axis
    pub const SIDE_OFFSET_X: f32 = 1.5;

    /// Fraction of the remaining jump distance covered per 60 Hz frame
    pub const JUMP_SPEED: f32 = 0.15;
    /// Player fall speed (units/s)
    pub const FALL_SPEED: f32 = 18.0;
    /// Snap distance that ends a jump
    pub const POSITION_EPSILON: f32 = 0.01;

    /// Broken pane fall progress per second (1.0 = fully fallen)
    pub const GLASS_FALL_RATE: f32 = 3.0;

    /// Reference frame rate the per-frame motion constants were tuned at
    pub const REFERENCE_FPS: f32 = 60.0;
}
