//! Glass Bridge headless runner
//!
//! Drives the match engine with a simulated 60 Hz frame loop and an autopilot
//! that remembers the path with a configurable error rate.
//!
//! Usage: `glass-bridge [seed] [levels] [error-rate]`

use std::sync::Arc;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use glass_bridge::Tuning;
use glass_bridge::sim::{Effects, Game, GameState, ManualTime, TimeSource};

/// Simulated frame length
const FRAME_MS: u64 = 16;
/// Autopilot thinks this long between jumps
const THINK_MS: u64 = 260;
/// Hard stop for runs that never reach the target level
const MAX_FRAMES: u64 = 200_000;

/// Logs effects instead of drawing particles
struct LogEffects;

impl Effects for LogEffects {
    fn spawn_land_effect(&mut self, pos: Vec3) {
        log::debug!("land burst at ({:.1}, {:.1}, {:.1})", pos.x, pos.y, pos.z);
    }

    fn spawn_break_effect(&mut self, pos: Vec3) {
        log::debug!("glass shatters at ({:.1}, {:.1}, {:.1})", pos.x, pos.y, pos.z);
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(2026);
    let target_level: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);
    let error_rate: f64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.1_f64)
        .clamp(0.0, 1.0);

    log::info!(
        "Glass Bridge (headless) seed={} target level={} error rate={:.2}",
        seed,
        target_level,
        error_rate
    );

    let time = Arc::new(ManualTime::new(0));
    let mut game = Game::with_tuning(seed, Tuning::default(), time.clone());
    game.set_effects(Box::new(LogEffects));
    let mut autopilot = Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15);

    game.start_game();
    let mut next_think = 0;
    let mut frames = 0;

    while game.current_level() < target_level && frames < MAX_FRAMES {
        let now = time.advance(FRAME_MS);
        frames += 1;

        match game.game_state() {
            GameState::Playing if now >= next_think && !game.is_respawning() => {
                if let Some(platform) = game.platforms().get(game.next_platform()) {
                    let correct = platform.spec.correct_side;
                    let side = if autopilot.random_bool(error_rate) {
                        correct.opposite()
                    } else {
                        correct
                    };
                    game.jump(side);
                    next_think = now + THINK_MS;
                }
            }
            GameState::Won => {
                println!(
                    "Level {} cleared in {:.2}s",
                    game.current_level() - 1,
                    game.elapsed_seconds()
                );
                game.start_game();
            }
            _ => {}
        }

        game.update_at(now);
    }

    let stats = game.stats();
    println!(
        "\nReached level {} (highest {}) after {:.1}s simulated, {} wins, {} falls, best {:.2}s",
        stats.current_level,
        stats.highest_level_reached,
        time.now_ms() as f64 / 1000.0,
        stats.wins,
        stats.falls,
        stats.best_time_seconds()
    );

    game.cleanup();
}
