//! Game settings and preferences

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Screen shake on landings/breaks
    pub screen_shake: bool,
    /// Multiplier applied to the raw shake amount (0.0 - 1.0)
    pub shake_scale: f32,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,
            shake_scale: 1.0,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Scale a raw shake amount for the camera
    pub fn apply_shake(&self, raw: f32) -> f32 {
        if !self.effective_screen_shake() {
            return 0.0;
        }
        (raw * self.shake_scale.clamp(0.0, 1.0)).max(0.0)
    }
}
