//! Game settings and preferences
//!
//! Persisted separately from the high score as a JSON blob.

use serde::{Deserialize, Serialize};

use crate::consts::{BULLET_TICK_MS, MAX_CATCHUP_TICKS, SWEEP_TICK_MS};
use crate::persistence::KeyValueStore;

/// Which on-screen controls to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ControlsMode {
    /// Touch buttons on mobile, keyboard hints on desktop
    #[default]
    Auto,
    /// Always show touch buttons
    Touch,
    /// Never show touch buttons
    Keyboard,
}

impl ControlsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlsMode::Auto => "auto",
            ControlsMode::Touch => "touch",
            ControlsMode::Keyboard => "keyboard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(ControlsMode::Auto),
            "touch" | "mobile" => Some(ControlsMode::Touch),
            "keyboard" | "desktop" => Some(ControlsMode::Keyboard),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bullet movement / collision cadence
    pub bullet_interval_ms: f64,
    /// Formation sweep cadence
    pub sweep_interval_ms: f64,
    /// Ticks replayed per frame before the backlog is dropped
    pub max_catchup_ticks: u32,
    pub controls: ControlsMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bullet_interval_ms: BULLET_TICK_MS,
            sweep_interval_ms: SWEEP_TICK_MS,
            max_catchup_ticks: MAX_CATCHUP_TICKS,
            controls: ControlsMode::Auto,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "space_invaders_settings";

    /// Parse settings JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Replace nonsensical cadences with the defaults
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.bullet_interval_ms.is_finite() && self.bullet_interval_ms > 0.0) {
            self.bullet_interval_ms = defaults.bullet_interval_ms;
        }
        if !(self.sweep_interval_ms.is_finite() && self.sweep_interval_ms > 0.0) {
            self.sweep_interval_ms = defaults.sweep_interval_ms;
        }
        self.max_catchup_ticks = self.max_catchup_ticks.max(1);
        self
    }

    /// Load settings from the store, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring unreadable settings: {}", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Apply a `controls=<mode>` override from a URL query string such as
    /// `?controls=touch`. Returns true when the mode changed.
    pub fn apply_query(&mut self, query: &str) -> bool {
        let requested = query
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "controls")
            .map(|(_, value)| value);
        let Some(value) = requested else {
            return false;
        };
        match ControlsMode::from_str(value) {
            Some(mode) if mode != self.controls => {
                log::info!("Controls {} -> {}", self.controls.as_str(), mode.as_str());
                self.controls = mode;
                true
            }
            Some(_) => false,
            None => {
                log::warn!("Unknown controls mode `{}`", value);
                false
            }
        }
    }

    /// Save settings to the store
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("{}", e),
            },
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults_match_reference_cadence() {
        let settings = Settings::default();
        assert_eq!(settings.bullet_interval_ms, 50.0);
        assert_eq!(settings.sweep_interval_ms, 500.0);
        assert_eq!(settings.controls, ControlsMode::Auto);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"controls":"touch"}"#).ok();
        assert_eq!(
            settings,
            Some(Settings {
                controls: ControlsMode::Touch,
                ..Settings::default()
            })
        );
    }

    #[test]
    fn test_bad_cadence_is_replaced() {
        let settings = Settings::from_json(r#"{"bullet_interval_ms":0,"max_catchup_ticks":0}"#)
            .unwrap_or_default();
        assert_eq!(settings.bullet_interval_ms, BULLET_TICK_MS);
        assert_eq!(settings.max_catchup_ticks, 1);
    }

    #[test]
    fn test_load_garbage_uses_defaults() {
        let store = MemoryStore::new().with_entry(Settings::STORAGE_KEY, "{not json");
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            sweep_interval_ms: 250.0,
            controls: ControlsMode::Keyboard,
            ..Settings::default()
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_controls_mode_names() {
        assert_eq!(ControlsMode::from_str("Mobile"), Some(ControlsMode::Touch));
        assert_eq!(ControlsMode::from_str("nope"), None);
        assert_eq!(ControlsMode::Keyboard.as_str(), "keyboard");
    }

    #[test]
    fn test_query_override_is_saved() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::load(&store);

        assert!(settings.apply_query("?level=2&controls=mobile"));
        assert_eq!(settings.controls, ControlsMode::Touch);
        settings.save(&mut store);
        assert_eq!(Settings::load(&store).controls, ControlsMode::Touch);

        // Same mode again, unknown mode, or no override: nothing to save
        assert!(!settings.apply_query("?controls=touch"));
        assert!(!settings.apply_query("?controls=joystick"));
        assert!(!settings.apply_query(""));
        assert_eq!(settings.controls, ControlsMode::Touch);
    }
}
