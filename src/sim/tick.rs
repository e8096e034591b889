//! Per-frame update
//!
//! The only place time-driven state changes happen: queued input intents are
//! applied, due deferred actions run, the memory preview counts down, and
//! entities animate.

use std::sync::Arc;

use super::game::Game;
use super::state::GameState;
use crate::Millis;

impl Game {
    /// Advance one frame at the time source's current time
    pub fn update(&mut self) {
        let now = self.now();
        self.update_at(now);
    }

    /// Advance one frame at `now`
    pub fn update_at(&mut self, now: Millis) {
        if !self.is_active {
            return;
        }

        let now = now.max(self.last_frame_time);
        let dt = ((now - self.last_frame_time) as f32 / 1000.0).min(self.tuning.max_delta_time);
        self.last_frame_time = now;

        for side in self.inputs.take_all() {
            self.handle_jump(side, now);
        }

        if self.state == GameState::Paused {
            return;
        }

        self.decay_shake(dt);

        let scheduler = Arc::clone(&self.scheduler);
        scheduler.drain(now, self);
        if !self.is_active {
            return;
        }

        if self.state == GameState::MemoryPhase {
            self.update_memory_phase(now);
        }

        self.player.update(dt);
        for platform in &mut self.platforms {
            platform.update(dt);
        }
    }

    fn decay_shake(&mut self, dt: f32) {
        if self.shake > 0.0 {
            self.shake = (self.shake - self.tuning.shake_decay_rate * dt).max(0.0);
        }
    }

    fn update_memory_phase(&mut self, now: Millis) {
        let shown_for = now.saturating_sub(self.memory_started_at);
        let remaining = self.level_config().memory_display_ms.saturating_sub(shown_for);

        if remaining == 0 {
            for platform in &mut self.platforms {
                platform.show_memory_hint(false);
            }
            self.state = GameState::Playing;
            log::debug!("Memory preview over, level {} is live", self.current_level());
            return;
        }

        let fade = self.tuning.memory_fade_ms;
        if fade > 0 && remaining < fade {
            let alpha = remaining as f32 / fade as f32;
            for platform in &mut self.platforms {
                platform.set_memory_hint_alpha(alpha);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;
    use parking_lot::Mutex;

    use super::*;
    use crate::Tuning;
    use crate::sim::clock::ManualTime;
    use crate::sim::state::{Effects, Side};

    const START_MS: Millis = 10_000;

    fn setup(tuning: Tuning) -> (Game, Arc<ManualTime>) {
        let time = Arc::new(ManualTime::new(START_MS));
        let game = Game::with_tuning(12345, tuning, time.clone());
        (game, time)
    }

    fn step(game: &mut Game, time: &ManualTime, ms: Millis) {
        let now = time.advance(ms);
        game.update_at(now);
    }

    fn correct_side(game: &Game) -> Side {
        game.platforms()[game.next_platform()].spec.correct_side
    }

    /// Cross the whole level without a mistake
    fn clear_level(game: &mut Game, time: &ManualTime) {
        while game.next_platform() < game.platforms().len() {
            let side = correct_side(game);
            assert!(game.jump(side));
            step(game, time, 250);
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Effects for Recorder {
        fn spawn_land_effect(&mut self, _pos: Vec3) {
            self.events.lock().push("land");
        }
        fn spawn_break_effect(&mut self, _pos: Vec3) {
            self.events.lock().push("break");
        }
    }

    struct ExplodingEffects;

    impl Effects for ExplodingEffects {
        fn spawn_land_effect(&mut self, _pos: Vec3) {}
        fn spawn_break_effect(&mut self, _pos: Vec3) {
            panic!("particle pool exhausted");
        }
    }

    #[test]
    fn test_starts_in_menu() {
        let (game, _time) = setup(Tuning::default());
        assert_eq!(game.game_state(), GameState::Menu);
        assert_eq!(game.current_level(), 1);
        assert_eq!(game.current_platform_count(), 5);
        assert_eq!(game.elapsed_seconds(), 0.0);
        assert_eq!(game.next_platform(), 1);
    }

    #[test]
    fn test_jump_ignored_in_menu() {
        let (mut game, _time) = setup(Tuning::default());
        assert!(!game.jump_left());
        assert!(!game.jump_right());
        assert_eq!(game.next_platform(), 1);
    }

    #[test]
    fn test_clear_level_wins_and_advances() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        game.start_game();
        assert!(game.is_playing());

        for _ in 0..3 {
            let side = correct_side(&game);
            assert!(game.jump(side));
            step(&mut game, &time, 250);
        }
        assert!(game.is_playing());
        assert_eq!(game.next_platform(), 4);

        // Finish platform is full width
        assert!(game.jump_right());
        step(&mut game, &time, 16);

        assert!(game.is_game_won());
        assert_eq!(game.current_level(), 2);
        assert_eq!(game.highest_level_reached(), 2);
        // Land effects of the last two jumps are still on their way
        assert_eq!(game.pending_events(), 2);

        // Elapsed is frozen at the win and recorded as best time
        let elapsed = game.elapsed_seconds();
        // Timer ran from the first jump to the tick that resolved the finish
        assert!((elapsed - 0.766).abs() < 1e-9);
        step(&mut game, &time, 5_000);
        assert_eq!(game.pending_events(), 0);
        assert_eq!(game.elapsed_seconds(), elapsed);
        assert_eq!(game.best_time_seconds(), elapsed);
    }

    #[test]
    fn test_start_after_win_plays_next_level() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        game.start_game();
        clear_level(&mut game, &time);
        assert!(game.is_game_won());

        game.start_game();
        assert!(game.is_playing());
        assert_eq!(game.current_level(), 2);
        assert_eq!(game.next_platform(), 1);
        assert_eq!(game.elapsed_seconds(), 0.0);
    }

    #[test]
    fn test_wrong_side_breaks_then_regresses() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        game.start_game();
        clear_level(&mut game, &time);
        game.start_game();
        assert_eq!(game.current_level(), 2);

        let wrong = correct_side(&game).opposite();
        assert!(game.jump(wrong));
        // Player is committed to the pane immediately
        assert_eq!(game.player().target(), game.platforms()[1].landing_point(wrong));
        assert!(game.is_respawning());

        step(&mut game, &time, 299);
        assert!(!game.platforms()[1].is_broken(wrong));

        step(&mut game, &time, 1);
        assert!(game.platforms()[1].is_broken(wrong));
        assert!(!game.platforms()[1].is_broken(wrong.opposite()));
        assert_eq!(game.shake_amount(), game.tuning().break_shake);
        assert!(game.player().is_falling());
        assert_eq!(game.current_level(), 2);

        // Still resolving, further input is ignored
        step(&mut game, &time, 100);
        assert!(!game.jump_left());
        assert!(!game.jump_right());

        step(&mut game, &time, 100);
        assert!(game.is_playing());
        assert_eq!(game.current_level(), 1);
        assert_eq!(game.highest_level_reached(), 2);
        assert_eq!(game.next_platform(), 1);
        assert!(!game.is_respawning());
        assert!(game.platforms().iter().all(|p| !p.left_broken && !p.right_broken));
        assert_eq!(game.stats().falls, 1);
    }

    #[test]
    fn test_fail_on_first_level_stays_on_first_level() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        game.start_game();
        let wrong = correct_side(&game).opposite();
        assert!(game.jump(wrong));
        step(&mut game, &time, 300);
        step(&mut game, &time, 200);
        assert!(game.is_playing());
        assert_eq!(game.current_level(), 1);
        assert_eq!(game.next_platform(), 1);
    }

    #[test]
    fn test_post_respawn_cooldown() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        game.start_game();
        let wrong = correct_side(&game).opposite();
        game.jump(wrong);
        step(&mut game, &time, 300);
        step(&mut game, &time, 200);
        assert!(game.is_playing());

        let side = correct_side(&game);
        time.advance(249);
        assert!(!game.jump(side));
        time.advance(1);
        assert!(game.jump(side));
    }

    #[test]
    fn test_cleanup_while_respawn_pending() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        game.start_game();
        let wrong = correct_side(&game).opposite();
        game.jump(wrong);
        step(&mut game, &time, 300);
        assert!(game.platforms()[1].is_broken(wrong));
        assert_eq!(game.pending_events(), 1);

        game.cleanup();
        assert!(!game.is_active());
        assert_eq!(game.pending_events(), 0);

        let state = game.game_state();
        let level = game.current_level();
        let player = game.player().pos;
        for _ in 0..20 {
            step(&mut game, &time, 100);
        }
        assert_eq!(game.game_state(), state);
        assert_eq!(game.current_level(), level);
        assert_eq!(game.player().pos, player);
        assert_eq!(game.next_platform(), 1);
        assert!(game.platforms()[1].is_broken(wrong));

        assert!(!game.jump_left());
        game.start_game();
        game.return_to_menu();
        assert_eq!(game.game_state(), state);
    }

    #[test]
    fn test_debounce_accepts_one_of_two() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        game.start_game();
        let side = correct_side(&game);
        assert!(game.jump(side));
        time.advance(100);
        let side = correct_side(&game);
        assert!(!game.jump(side));
        assert_eq!(game.next_platform(), 2);
        time.advance(100);
        assert!(game.jump(side));
        assert_eq!(game.next_platform(), 3);
    }

    #[test]
    fn test_queued_intents_are_debounced_on_tick() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        game.start_game();
        let handle = game.input_handle();
        let side = correct_side(&game);
        let producer = handle.clone();
        std::thread::spawn(move || {
            producer.push(side);
            producer.push(side);
        })
        .join()
        .unwrap();

        // Nothing moves until the tick applies the intents
        assert_eq!(game.next_platform(), 1);
        step(&mut game, &time, 16);
        assert_eq!(game.next_platform(), 2);
        assert!(handle.is_empty());
    }

    #[test]
    fn test_memory_phase_gates_input_and_fades() {
        let (mut game, time) = setup(Tuning::default());
        game.start_game();
        assert!(game.is_in_memory_phase());
        assert_eq!(game.memory_phase_remaining_ms(), 5_000);
        assert!(game.platforms()[1].hint_visible);
        assert!(!game.platforms()[0].hint_visible);
        assert!(!game.jump_left());

        step(&mut game, &time, 4_750);
        assert!(game.is_in_memory_phase());
        assert_eq!(game.memory_phase_remaining_ms(), 250);
        assert!((game.platforms()[1].hint_alpha - 0.5).abs() < 1e-6);

        step(&mut game, &time, 250);
        assert!(game.is_playing());
        assert_eq!(game.memory_phase_remaining_ms(), 0);
        assert!(game.platforms().iter().all(|p| !p.hint_visible));
        let side = correct_side(&game);
        assert!(game.jump(side));
    }

    #[test]
    fn test_fail_returns_to_memory_phase() {
        let (mut game, time) = setup(Tuning::default());
        game.start_game();
        step(&mut game, &time, 5_000);
        let wrong = correct_side(&game).opposite();
        game.jump(wrong);
        step(&mut game, &time, 300);
        step(&mut game, &time, 200);
        assert!(game.is_in_memory_phase());
        assert_eq!(game.next_platform(), 1);
    }

    #[test]
    fn test_pause_freezes_clock_and_defers_consequences() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        game.start_game();
        let wrong = correct_side(&game).opposite();
        game.jump(wrong);
        step(&mut game, &time, 100);

        game.pause_game();
        assert_eq!(game.game_state(), GameState::Paused);
        let before = game.elapsed_seconds();
        assert_eq!(before, game.elapsed_seconds());
        for _ in 0..50 {
            step(&mut game, &time, 100);
        }
        assert_eq!(game.elapsed_seconds(), before);
        assert!(!game.platforms()[1].is_broken(wrong));
        assert!(!game.jump_left());

        game.resume_game();
        assert!(game.is_playing());
        assert_eq!(game.elapsed_seconds(), before);

        step(&mut game, &time, 199);
        assert!(!game.platforms()[1].is_broken(wrong));
        step(&mut game, &time, 1);
        assert!(game.platforms()[1].is_broken(wrong));
    }

    #[test]
    fn test_return_to_menu_drops_pending_win() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        game.start_game();
        for _ in 0..3 {
            let side = correct_side(&game);
            game.jump(side);
            step(&mut game, &time, 250);
        }
        assert!(game.jump_left());
        // The win plus two land effects
        assert_eq!(game.pending_events(), 3);

        game.return_to_menu();
        assert_eq!(game.pending_events(), 0);
        step(&mut game, &time, 16);
        assert_eq!(game.game_state(), GameState::Menu);
        assert_eq!(game.current_level(), 1);
        assert_eq!(game.elapsed_seconds(), 0.0);
    }

    #[test]
    fn test_restart_keeps_highest_level() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        game.start_game();
        clear_level(&mut game, &time);
        game.start_game();
        let wrong = correct_side(&game).opposite();
        game.jump(wrong);
        step(&mut game, &time, 300);
        step(&mut game, &time, 200);
        assert_eq!(game.current_level(), 1);

        game.restart_current_level();
        assert!(game.is_playing());
        assert_eq!(game.current_level(), 1);
        assert_eq!(game.highest_level_reached(), 2);
    }

    #[test]
    fn test_effects_ordering_and_shake_decay() {
        let (mut game, time) = setup(Tuning {
            respawn_delay_ms: 60_000,
            ..Tuning::without_memory_phase()
        });
        let recorder = Recorder::default();
        game.set_effects(Box::new(recorder.clone()));
        game.start_game();

        let side = correct_side(&game);
        game.jump(side);
        assert_eq!(game.shake_amount(), game.tuning().land_shake);
        assert!(recorder.events.lock().is_empty());
        step(&mut game, &time, 250);
        let wrong = correct_side(&game).opposite();
        game.jump(wrong);
        step(&mut game, &time, 300);
        assert_eq!(*recorder.events.lock(), vec!["land", "break"]);

        // Decay is clamped to the max tick delta
        step(&mut game, &time, 10_000);
        let expected = game.tuning().break_shake - game.tuning().shake_decay_rate * 0.05;
        assert!((game.shake_amount() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_land_effect_waits_for_touchdown() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        let recorder = Recorder::default();
        game.set_effects(Box::new(recorder.clone()));
        game.start_game();

        let side = correct_side(&game);
        assert!(game.jump(side));
        assert_eq!(game.pending_events(), 1);
        step(&mut game, &time, 299);
        assert!(recorder.events.lock().is_empty());
        step(&mut game, &time, 1);
        assert_eq!(*recorder.events.lock(), vec!["land"]);
        assert_eq!(game.pending_events(), 0);
    }

    #[test]
    fn test_land_effect_dropped_on_cleanup() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        let recorder = Recorder::default();
        game.set_effects(Box::new(recorder.clone()));
        game.start_game();

        let side = correct_side(&game);
        assert!(game.jump(side));
        game.cleanup();
        step(&mut game, &time, 1_000);
        assert!(recorder.events.lock().is_empty());
    }

    #[test]
    fn test_panicking_effect_does_not_strand_level() {
        let (mut game, time) = setup(Tuning::without_memory_phase());
        game.set_effects(Box::new(ExplodingEffects));
        game.start_game();
        let wrong = correct_side(&game).opposite();
        game.jump(wrong);
        step(&mut game, &time, 300);
        assert!(game.platforms()[1].is_broken(wrong));
        assert_eq!(game.pending_events(), 1);

        step(&mut game, &time, 200);
        assert!(game.is_playing());
        assert!(!game.is_respawning());
    }

    #[test]
    fn test_reduced_motion_hides_shake() {
        let (mut game, _time) = setup(Tuning::without_memory_phase());
        game.set_settings(crate::Settings {
            reduced_motion: true,
            ..Default::default()
        });
        game.start_game();
        let side = correct_side(&game);
        game.jump(side);
        assert_eq!(game.shake_amount(), 0.0);
    }

    #[test]
    fn test_determinism() {
        let (a, _) = setup(Tuning::default());
        let (b, _) = setup(Tuning::default());
        let sides = |g: &Game| g.platforms().iter().map(|p| p.spec.correct_side).collect::<Vec<_>>();
        assert_eq!(sides(&a), sides(&b));
    }
}
