//! Correct-side sequence generation
//!
//! Streaks of the same side get progressively less likely and are hard
//! capped, so a level never degenerates into a one-sided corridor.

use rand::Rng;

use super::state::Side;

/// Longest allowed run of platforms sharing a correct side
pub const MAX_STREAK: usize = 4;
/// Chance of repeating the previous side with no repeats yet
pub const BASE_REPEAT_CHANCE: f64 = 0.5;
/// Repeat chance lost per repeat already in the run
pub const REPEAT_PENALTY: f64 = 0.25;
pub const MIN_REPEAT_CHANCE: f64 = 0.05;
pub const MAX_REPEAT_CHANCE: f64 = 0.95;

/// Chance of repeating the previous side after `repeats` repeats
pub fn repeat_chance(repeats: usize) -> f64 {
    (BASE_REPEAT_CHANCE - REPEAT_PENALTY * repeats as f64).clamp(MIN_REPEAT_CHANCE, MAX_REPEAT_CHANCE)
}

/// Generate the correct side for `count` playable platforms
pub fn generate_sequence<R: Rng>(count: usize, rng: &mut R) -> Vec<Side> {
    let mut sides = Vec::with_capacity(count);
    if count == 0 {
        return sides;
    }

    let mut previous = if rng.random_bool(0.5) {
        Side::Left
    } else {
        Side::Right
    };
    sides.push(previous);

    // Repeats of `previous` beyond the first platform of the run
    let mut repeats = 0usize;
    for _ in 1..count {
        let next = if repeats + 1 >= MAX_STREAK {
            repeats = 0;
            previous.opposite()
        } else if rng.random_bool(repeat_chance(repeats)) {
            repeats += 1;
            previous
        } else {
            repeats = 0;
            previous.opposite()
        };
        sides.push(next);
        previous = next;
    }

    sides
}

/// Length of the longest same-side run
pub fn longest_streak(sides: &[Side]) -> usize {
    sides
        .chunk_by(|a, b| a == b)
        .map(|run| run.len())
        .max()
        .unwrap_or(0)
}
