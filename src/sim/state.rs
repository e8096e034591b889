//! Game state and simulation entities
//!
//! Platforms and the player are owned by the match and mutated only from the
//! tick thread; the renderer reads them.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Title screen, nothing running
    #[default]
    Menu,
    /// Correct path is being previewed, input closed
    MemoryPhase,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Finish platform reached
    Won,
}

/// Which pane of a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Lateral sign along X (left is negative)
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Generated description of one platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub index: usize,
    pub correct_side: Side,
    pub is_start: bool,
    pub is_finish: bool,
}

impl PlatformSpec {
    pub fn start() -> Self {
        Self {
            index: 0,
            correct_side: Side::Left,
            is_start: true,
            is_finish: false,
        }
    }

    pub fn glass(index: usize, correct_side: Side) -> Self {
        Self {
            index,
            correct_side,
            is_start: false,
            is_finish: false,
        }
    }

    pub fn finish(index: usize) -> Self {
        Self {
            index,
            correct_side: Side::Left,
            is_start: false,
            is_finish: true,
        }
    }

    /// Full-width start/finish platforms cannot break
    pub fn is_solid(&self) -> bool {
        self.is_start || self.is_finish
    }

    /// Landing on `side` is safe
    pub fn is_safe(&self, side: Side) -> bool {
        self.is_solid() || side == self.correct_side
    }
}

/// A platform in the world (two glass panes, or one solid slab)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub spec: PlatformSpec,
    pub left_broken: bool,
    pub right_broken: bool,
    /// Fall animation progress per pane (0 = intact, 1 = fully fallen)
    pub break_progress_left: f32,
    pub break_progress_right: f32,
    pub hint_visible: bool,
    pub hint_alpha: f32,
}

impl Platform {
    pub fn new(spec: PlatformSpec) -> Self {
        Self {
            spec,
            left_broken: false,
            right_broken: false,
            break_progress_left: 0.0,
            break_progress_right: 0.0,
            hint_visible: false,
            hint_alpha: 0.0,
        }
    }

    pub fn z(&self) -> f32 {
        self.spec.index as f32 * PLATFORM_Z_SPACING
    }

    /// Where the player lands when jumping onto `side`
    pub fn landing_point(&self, side: Side) -> Vec3 {
        let x = if self.spec.is_solid() {
            0.0
        } else {
            side.sign() * SIDE_OFFSET_X
        };
        Vec3::new(x, PLATFORM_Y, self.z())
    }

    pub fn is_broken(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left_broken,
            Side::Right => self.right_broken,
        }
    }

    pub fn break_side(&mut self, side: Side) {
        if self.spec.is_solid() {
            return;
        }
        match side {
            Side::Left => self.left_broken = true,
            Side::Right => self.right_broken = true,
        }
    }

    pub fn show_memory_hint(&mut self, show: bool) {
        self.hint_visible = show && !self.spec.is_solid();
        self.hint_alpha = if self.hint_visible { 1.0 } else { 0.0 };
    }

    pub fn set_memory_hint_alpha(&mut self, alpha: f32) {
        if self.hint_visible {
            self.hint_alpha = alpha.clamp(0.0, 1.0);
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.left_broken {
            self.break_progress_left = (self.break_progress_left + GLASS_FALL_RATE * dt).min(1.0);
        }
        if self.right_broken {
            self.break_progress_right = (self.break_progress_right + GLASS_FALL_RATE * dt).min(1.0);
        }
    }
}

/// The player avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec3,
    target: Vec3,
    start: Vec3,
    jumping: bool,
    falling: bool,
}

impl Player {
    pub fn new(start: Vec3) -> Self {
        Self {
            pos: start,
            target: start,
            start,
            jumping: false,
            falling: false,
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn is_falling(&self) -> bool {
        self.falling
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn jump_to(&mut self, target: Vec3) {
        self.target = target;
        self.jumping = true;
        self.falling = false;
    }

    pub fn fall(&mut self) {
        self.jumping = false;
        self.falling = true;
    }

    /// Snap back to the start platform at `start_z`
    pub fn respawn_to_start(&mut self, start_z: f32) {
        self.start.z = start_z;
        self.pos = self.start;
        self.target = self.start;
        self.jumping = false;
        self.falling = false;
    }

    pub fn update(&mut self, dt: f32) {
        if self.jumping {
            let delta = self.target - self.pos;
            if delta.abs().max_element() < POSITION_EPSILON {
                self.pos = self.target;
                self.jumping = false;
            } else {
                // Frame-rate independent version of "cover JUMP_SPEED of the gap per frame"
                let t = 1.0 - (1.0 - JUMP_SPEED).powf(dt * REFERENCE_FPS);
                self.pos += delta * t;
            }
        }

        if self.falling {
            self.pos.y -= FALL_SPEED * dt;
        }
    }
}

/// Fire-and-forget visual effects triggered by the match
pub trait Effects: Send {
    fn spawn_land_effect(&mut self, pos: Vec3);
    fn spawn_break_effect(&mut self, pos: Vec3);
}

/// Effects sink that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffects;

impl Effects for NoEffects {
    fn spawn_land_effect(&mut self, _pos: Vec3) {}
    fn spawn_break_effect(&mut self, _pos: Vec3) {}
}
