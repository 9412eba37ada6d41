//! Space Invaders - a browser arcade clone
//!
//! Core modules:
//! - `sim`: Deterministic game core (movement, collisions, phase machine)
//! - `input`: Raw keyboard/touch input to game intents
//! - `session`: Tick driver owning the single game state
//! - `persistence`: Key/value storage (LocalStorage on web)
//! - `platform`: Browser/native platform helpers
//! - `renderer`: Canvas 2D drawing and HUD (web only)

pub mod highscores;
pub mod input;
pub mod persistence;
pub mod platform;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use input::{DeviceClass, Intent};
pub use session::Session;
pub use settings::{ControlsMode, Settings};

/// Game configuration constants
pub mod consts {
    /// Play-field height (the field width comes from the host)
    pub const FIELD_HEIGHT: i32 = 500;
    /// Field width used until the host measures the real one
    pub const DEFAULT_FIELD_WIDTH: i32 = 600;

    /// Player ship
    pub const PLAYER_WIDTH: i32 = 50;
    pub const PLAYER_STEP: i32 = 20;
    /// Horizontal offset of the gun from the ship's left edge
    pub const PLAYER_GUN_OFFSET: i32 = 15;

    /// Player bullets
    pub const BULLET_SPAWN_Y: i32 = 480;
    pub const BULLET_STEP: i32 = 10;

    /// Invaders (square sprites, hit box is inclusive on all sides)
    pub const INVADER_SIZE: i32 = 40;
    pub const INVADER_STEP_X: i32 = 10;
    pub const INVADER_DROP: i32 = 20;
    /// An invader at or below this line ends the game (88% of the field)
    pub const INVADER_BOTTOM_LIMIT: i32 = FIELD_HEIGHT * 88 / 100;

    pub const POINTS_PER_INVADER: u32 = 100;

    /// Levels
    pub const FIRST_LEVEL: u8 = 1;
    pub const FINAL_LEVEL: u8 = 2;

    /// Tick cadences (milliseconds)
    pub const BULLET_TICK_MS: f64 = 50.0;
    pub const SWEEP_TICK_MS: f64 = 500.0;
    /// Maximum ticks replayed per frame to prevent spiral of death
    pub const MAX_CATCHUP_TICKS: u32 = 8;
}
