//! Match state machine
//!
//! Owns the level, platforms, player, and clock, and turns accepted jumps into
//! immediate moves plus deferred consequences on the event scheduler.

use std::sync::Arc;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::clock::{GameClock, TimeSource};
use super::input::{GateContext, InputGate, InputQueue};
use super::level::{LevelConfig, LevelDirector};
use super::scheduler::EventScheduler;
use super::sequence::generate_sequence;
use super::state::{Effects, GameState, NoEffects, Platform, PlatformSpec, Player, Side};
use crate::consts::PLATFORM_Y;
use crate::{Millis, RunStats, Settings, Tuning};

/// Offsets of the celebration bursts around the finish landing point
const WIN_BURST_OFFSETS: [f32; 3] = [0.0, 0.5, -0.5];

pub struct Game {
    pub(super) tuning: Tuning,
    settings: Settings,
    director: LevelDirector,
    time: Arc<dyn TimeSource>,
    seed: u64,
    rng: Pcg32,
    pub(super) scheduler: Arc<EventScheduler<Game>>,
    effects: Box<dyn Effects>,
    pub(super) inputs: InputQueue,

    pub(super) state: GameState,
    level: LevelConfig,
    pub(super) platforms: Vec<Platform>,
    pub(super) player: Player,
    clock: GameClock,
    gate: InputGate,
    stats: RunStats,

    next_platform: usize,
    is_respawning: bool,
    pub(super) is_active: bool,
    pub(super) shake: f32,
    /// Timestamp of the latest tick; deferred actions run "at" this time
    pub(super) last_frame_time: Millis,
    pub(super) memory_started_at: Millis,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("seed", &self.seed)
            .field("state", &self.state)
            .field("level", &self.level)
            .field("next_platform", &self.next_platform)
            .field("is_respawning", &self.is_respawning)
            .field("is_active", &self.is_active)
            .field("pending_events", &self.scheduler.len())
            .finish()
    }
}

impl Game {
    /// Create a game with default tuning, sitting in the menu at level 1
    pub fn new(seed: u64, time: Arc<dyn TimeSource>) -> Self {
        Self::with_tuning(seed, Tuning::default(), time)
    }

    pub fn with_tuning(seed: u64, tuning: Tuning, time: Arc<dyn TimeSource>) -> Self {
        let director = LevelDirector::new(tuning.levels.clone());
        let level = director.level_config(1);
        let now = time.now_ms();

        let mut game = Self {
            gate: InputGate::new(tuning.input_delay_ms),
            tuning,
            settings: Settings::default(),
            director,
            time,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            scheduler: Arc::new(EventScheduler::new()),
            effects: Box::new(NoEffects),
            inputs: InputQueue::new(),
            state: GameState::Menu,
            level,
            platforms: Vec::new(),
            player: Player::new(Vec3::new(0.0, PLATFORM_Y, 0.0)),
            clock: GameClock::new(),
            stats: RunStats::new(),
            next_platform: 1,
            is_respawning: false,
            is_active: true,
            shake: 0.0,
            last_frame_time: now,
            memory_started_at: now,
        };
        game.initialize_level(now);
        game
    }

    pub fn set_effects(&mut self, effects: Box<dyn Effects>) {
        self.effects = effects;
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub(super) fn now(&self) -> Millis {
        self.time.now_ms()
    }

    /// Queue `action` on the scheduler; it becomes a no-op once the game is cleaned up
    fn schedule<F>(&self, now: Millis, delay_ms: Millis, action: F)
    where
        F: FnOnce(&mut Game) + Send + 'static,
    {
        let delay = i64::try_from(delay_ms).unwrap_or(i64::MAX);
        self.scheduler.enqueue(now, delay, move |game: &mut Game| {
            if !game.is_active {
                return;
            }
            action(game);
        });
    }

    /// Rebuild the current level from scratch and flush anything still pending
    fn initialize_level(&mut self, now: Millis) {
        let dropped = self.scheduler.clear();
        if dropped > 0 {
            log::debug!("Discarded {} pending events on level reset", dropped);
        }

        let config = self.director.level_config(self.stats.current_level);
        let playable = config.playable_platforms() as usize;
        let sides = generate_sequence(playable, &mut self.rng);

        let mut platforms = Vec::with_capacity(config.total_platforms as usize);
        platforms.push(Platform::new(PlatformSpec::start()));
        platforms.extend(
            sides
                .into_iter()
                .enumerate()
                .map(|(i, side)| Platform::new(PlatformSpec::glass(i + 1, side))),
        );
        platforms.push(Platform::new(PlatformSpec::finish(playable + 1)));

        self.player.respawn_to_start(platforms[0].z());
        self.platforms = platforms;
        self.level = config;
        self.next_platform = 1;
        self.is_respawning = false;
        self.shake = 0.0;
        self.gate.reset();
        self.clock = GameClock::new();
        self.last_frame_time = now;

        log::info!(
            "Level {} ready: {} platforms, {}ms memory preview",
            config.level,
            config.total_platforms,
            config.memory_display_ms
        );
    }

    /// Enter the freshly initialized level (memory preview first, if enabled)
    fn enter_level(&mut self, now: Millis) {
        if self.tuning.memory_phase_enabled && self.level.memory_display_ms > 0 {
            self.state = GameState::MemoryPhase;
            self.memory_started_at = now;
            for platform in &mut self.platforms {
                platform.show_memory_hint(true);
            }
        } else {
            self.state = GameState::Playing;
        }
    }

    // === Lifecycle ===

    /// Start playing the current level (from the menu, or onward after a win)
    pub fn start_game(&mut self) {
        if !self.is_active || !matches!(self.state, GameState::Menu | GameState::Won) {
            return;
        }
        let now = self.now();
        self.initialize_level(now);
        self.enter_level(now);
        log::info!("Game started at level {}", self.stats.current_level);
    }

    /// Replay the current level; progress records are untouched
    pub fn restart_current_level(&mut self) {
        if !self.is_active || self.state == GameState::Menu {
            return;
        }
        let now = self.now();
        self.initialize_level(now);
        self.enter_level(now);
        log::info!("Restarted level {}", self.stats.current_level);
    }

    pub fn pause_game(&mut self) {
        if !self.is_active || self.state != GameState::Playing {
            return;
        }
        self.clock.pause(self.now());
        self.state = GameState::Paused;
        log::info!("Paused");
    }

    pub fn resume_game(&mut self) {
        if !self.is_active || self.state != GameState::Paused {
            return;
        }
        let now = self.now();
        let paused_for = self.clock.resume(now);
        // Deferred consequences keep their play-time spacing
        self.scheduler.postpone(paused_for);
        self.state = GameState::Playing;
        self.last_frame_time = now;
        log::info!("Resumed after {}ms", paused_for);
    }

    pub fn return_to_menu(&mut self) {
        if !self.is_active {
            return;
        }
        let now = self.now();
        self.state = GameState::Menu;
        self.initialize_level(now);
        log::info!("Returned to menu");
    }

    /// Tear down: every pending and future deferred action becomes a no-op
    pub fn cleanup(&mut self) {
        if !self.is_active {
            return;
        }
        self.is_active = false;
        let dropped = self.scheduler.clear();
        self.inputs.clear();
        log::info!("Cleaned up ({} pending events discarded)", dropped);
    }

    // === Input ===

    pub fn jump_left(&mut self) -> bool {
        self.jump(Side::Left)
    }

    pub fn jump_right(&mut self) -> bool {
        self.jump(Side::Right)
    }

    /// Jump toward `side` of the next platform; false if the gate rejected it
    pub fn jump(&mut self, side: Side) -> bool {
        let now = self.now();
        self.handle_jump(side, now)
    }

    /// Handle for input threads; intents are applied on the next update
    pub fn input_handle(&self) -> InputQueue {
        self.inputs.clone()
    }

    /// Resolve one jump onto the next platform; the finish platform is a jump target too
    pub(super) fn handle_jump(&mut self, side: Side, now: Millis) -> bool {
        let ctx = GateContext {
            active: self.is_active,
            state: self.state,
            respawning: self.is_respawning,
            next_platform: self.next_platform,
            platform_count: self.platforms.len(),
        };
        if !self.gate.accept(&ctx, &mut self.clock, now) {
            return false;
        }

        let index = self.next_platform;
        let platform = &self.platforms[index];
        let target = platform.landing_point(side);
        let safe = platform.spec.is_safe(side);
        let is_final = index + 1 == self.platforms.len();

        // The move is committed before correctness shows
        self.player.jump_to(target);

        if safe {
            self.next_platform += 1;
            self.shake = self.shake.max(self.tuning.land_shake);
            if is_final {
                self.schedule(now, 0, Game::win_level);
            }
            // Particles appear when the player touches down, not on takeoff
            self.schedule(now, self.tuning.landing_delay_ms, move |game| {
                game.effects.spawn_land_effect(target)
            });
        } else {
            self.is_respawning = true;
            self.schedule(now, self.tuning.landing_delay_ms, move |game| {
                game.break_platform(index, side)
            });
            log::debug!("Wrong side {:?} on platform {}", side, index);
        }
        true
    }

    /// Deferred step two of a wrong jump: the pane gives way
    fn break_platform(&mut self, index: usize, side: Side) {
        if self.state != GameState::Playing {
            return;
        }
        let now = self.last_frame_time;
        let Some(platform) = self.platforms.get_mut(index) else {
            return;
        };
        platform.break_side(side);
        let pane = platform.landing_point(side);

        self.shake = self.tuning.break_shake;
        self.is_respawning = true;
        self.player.fall();
        // Queue step three before calling out, so a failing effect cannot strand the level
        self.schedule(now, self.tuning.respawn_delay_ms, Game::fail_level);
        self.effects.spawn_break_effect(pane);
    }

    /// Deferred step three of a wrong jump: regress one level and go again
    fn fail_level(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        let now = self.last_frame_time;
        let failed = self.stats.current_level;
        self.stats.record_fall();
        self.initialize_level(now);
        self.gate.close_for(now, self.tuning.post_respawn_cooldown_ms);
        self.enter_level(now);
        log::info!("Fell on level {}, back to level {}", failed, self.stats.current_level);
    }

    fn win_level(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        let now = self.last_frame_time;
        self.clock.win(now);
        self.state = GameState::Won;

        let elapsed = self.clock.elapsed_ms(GameState::Won, now);
        let won = self.stats.current_level;
        let is_best = self.stats.record_win(elapsed);
        log::info!(
            "Level {} cleared in {:.2}s{}",
            won,
            elapsed as f64 / 1000.0,
            if is_best { " (new best)" } else { "" }
        );

        let landing = self.player.target();
        for offset in WIN_BURST_OFFSETS {
            self.effects.spawn_land_effect(landing + Vec3::new(offset, 0.0, 0.0));
        }
    }

    // === Queries ===

    pub fn game_state(&self) -> GameState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == GameState::Playing
    }

    pub fn is_in_memory_phase(&self) -> bool {
        self.state == GameState::MemoryPhase
    }

    pub fn is_game_won(&self) -> bool {
        self.state == GameState::Won
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn current_level(&self) -> u32 {
        self.stats.current_level
    }

    pub fn highest_level_reached(&self) -> u32 {
        self.stats.highest_level_reached
    }

    pub fn current_platform_count(&self) -> u32 {
        self.level.total_platforms
    }

    pub fn current_memory_time_seconds(&self) -> f32 {
        self.level.memory_display_seconds()
    }

    pub fn level_config(&self) -> &LevelConfig {
        &self.level
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.clock.elapsed_seconds(self.state, self.now())
    }

    pub fn best_time_seconds(&self) -> f64 {
        self.stats.best_time_seconds()
    }

    /// Camera shake after user preferences
    pub fn shake_amount(&self) -> f32 {
        self.settings.apply_shake(self.shake)
    }

    pub fn memory_phase_remaining_ms(&self) -> Millis {
        if self.state != GameState::MemoryPhase {
            return 0;
        }
        let shown_for = self.now().saturating_sub(self.memory_started_at);
        self.level.memory_display_ms.saturating_sub(shown_for)
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn next_platform(&self) -> usize {
        self.next_platform
    }

    pub fn is_respawning(&self) -> bool {
        self.is_respawning
    }

    pub fn pending_events(&self) -> usize {
        self.scheduler.len()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
