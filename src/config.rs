use serde::{Deserialize, Serialize};

use crate::error::{RuntimeError, RuntimeResult};

// ── Screen ────────────────────────────────────────────────────────────────────

/// Stage resolution and fencing policy, threaded explicitly into every
/// sprite operation.
///
/// Target space is Cartesian with the origin at the centre of the screen and
/// +Y up; screen space has its origin at the top-left corner and +Y down.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    pub width: u32,
    pub height: u32,
    /// Clamp sprite positions so they stay on (or just off) the stage.
    pub fencing: bool,
}

impl Screen {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, fencing: true }
    }

    /// Integer half-width, as used for screen-origin conversion.
    pub fn half_width(&self) -> i32 {
        (self.width / 2) as i32
    }

    /// Integer half-height, as used for screen-origin conversion.
    pub fn half_height(&self) -> i32 {
        (self.height / 2) as i32
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(480, 360)
    }
}

// ── RuntimeConfig ─────────────────────────────────────────────────────────────

/// Runtime configuration snapshot.
///
/// The embedding application owns this value and may change it between frames;
/// the runtime only observes it through `refresh_screen_dimensions`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Stage width in pixels.
    pub screen_width: u32,
    /// Stage height in pixels.
    pub screen_height: u32,
    /// Disables sprite fencing when set.
    pub allow_off_screen_sprites: bool,
    /// Emit debug-level sprite events.
    pub enable_debug_messages: bool,
    /// Forward the project's log/warn/error custom blocks to the log.
    pub show_project_logs: bool,
    /// Catalog language for diagnostic text.
    pub language: String,
    /// Seed for "go to random position".
    pub random_seed: u64,
}

impl Default for RuntimeConfig {
    /// Scratch's native 480 × 360 stage with fencing on.
    fn default() -> Self {
        Self {
            screen_width: 480,
            screen_height: 360,
            allow_off_screen_sprites: false,
            enable_debug_messages: true,
            show_project_logs: true,
            language: "en".to_string(),
            random_seed: 0x5eed,
        }
    }
}

impl RuntimeConfig {
    /// Parse a JSON configuration document. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> RuntimeResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| RuntimeError::project(format!("invalid config: {e}")))
    }

    /// Current screen as seen by sprite operations.
    pub fn screen(&self) -> Screen {
        Screen {
            width: self.screen_width,
            height: self.screen_height,
            fencing: !self.allow_off_screen_sprites,
        }
    }
}
