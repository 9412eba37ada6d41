//! High score persistence
//!
//! A single best score, stored as a decimal string under a fixed key.
//! Read once when the session starts, written when a run beats it.

use crate::persistence::KeyValueStore;

/// Storage key for the best score
pub const HIGH_SCORE_KEY: &str = "highScore";

/// Parse a stored score. Anything missing or malformed counts as 0.
pub fn parse_high_score(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return 0;
    };
    match raw.trim().parse::<u32>() {
        Ok(score) => score,
        Err(_) => {
            log::warn!("Ignoring malformed high score {:?}", raw);
            0
        }
    }
}

/// The persisted best score
pub struct HighScores {
    store: Box<dyn KeyValueStore>,
}

impl HighScores {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current best score (0 if none or unreadable)
    pub fn get(&self) -> u32 {
        match self.store.get(HIGH_SCORE_KEY) {
            Ok(raw) => parse_high_score(raw.as_deref()),
            Err(e) => {
                log::warn!("{}", e);
                0
            }
        }
    }

    /// Store a new best score
    pub fn set(&mut self, score: u32) {
        match self.store.set(HIGH_SCORE_KEY, &score.to_string()) {
            Ok(()) => log::info!("High score saved ({})", score),
            Err(e) => log::warn!("{}", e),
        }
    }
}
