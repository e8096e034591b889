//! Match-progression engine
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform dependencies:
//! - Time comes from an injected `TimeSource`
//! - Seeded RNG only
//! - State changes only from the tick (`Game::update`) or marshaled input
//! - Delayed consequences go through the `EventScheduler`, never real threads

pub mod clock;
pub mod game;
pub mod input;
pub mod level;
pub mod scheduler;
pub mod sequence;
pub mod state;
pub mod tick;

pub use clock::{GameClock, ManualTime, MonotonicTime, TimeSource};
pub use game::Game;
pub use input::{GateContext, InputGate, InputQueue};
pub use level::{LevelConfig, LevelDirector};
pub use scheduler::EventScheduler;
pub use sequence::{MAX_STREAK, generate_sequence, longest_streak};
pub use state::{Effects, GameState, NoEffects, Platform, PlatformSpec, Player, Side};
