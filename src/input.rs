//! Input intent mapping
//!
//! Keyboard keys and on-screen buttons both collapse into `Intent`s here.
//! The game core never sees which device produced them.

use crate::settings::ControlsMode;
use crate::sim::GamePhase;
pub use crate::sim::Intent;

/// Keys that never count as "any key" on the title screen
const MODIFIER_KEYS: &[&str] = &["Shift", "Control", "Alt", "Meta", "CapsLock", "Tab"];

/// On-screen controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Left,
    Right,
    Fire,
    /// Tap anywhere on the title screen
    Screen,
    /// "Play Again" on the end screen
    PlayAgain,
}

/// Map a `KeyboardEvent.key` value to an intent
pub fn map_key(key: &str, phase: GamePhase) -> Option<Intent> {
    match phase {
        GamePhase::Start => (!MODIFIER_KEYS.contains(&key)).then_some(Intent::Start),
        GamePhase::Playing => match key {
            "ArrowLeft" | "Left" => Some(Intent::MoveLeft),
            "ArrowRight" | "Right" => Some(Intent::MoveRight),
            " " | "Spacebar" => Some(Intent::Fire),
            _ => None,
        },
        GamePhase::GameOver | GamePhase::Victory => match key {
            "Enter" => Some(Intent::Replay),
            _ => None,
        },
    }
}

/// Map an on-screen control to an intent
pub fn map_control(control: Control) -> Intent {
    match control {
        Control::Left => Intent::MoveLeft,
        Control::Right => Intent::MoveRight,
        Control::Fire => Intent::Fire,
        Control::Screen => Intent::Start,
        Control::PlayAgain => Intent::Replay,
    }
}

/// Coarse device class, used only to pick which controls to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    pub fn from_user_agent(user_agent: &str) -> Self {
        const MOBILE_MARKERS: [&str; 4] = ["iPhone", "iPad", "iPod", "Android"];
        let ua = user_agent.to_lowercase();
        if MOBILE_MARKERS.iter().any(|m| ua.contains(&m.to_lowercase())) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Which affordances the host should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    pub touch_buttons: bool,
    pub start_prompt: &'static str,
}

impl Affordances {
    pub fn resolve(device: DeviceClass, mode: ControlsMode) -> Self {
        let touch = match mode {
            ControlsMode::Auto => device == DeviceClass::Mobile,
            ControlsMode::Touch => true,
            ControlsMode::Keyboard => false,
        };
        Self {
            touch_buttons: touch,
            start_prompt: if touch {
                "Tap to start"
            } else {
                "Press any key to start"
            },
        }
    }
}
