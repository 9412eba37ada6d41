//! Session driver
//!
//! Owns the one `GameState` and is the only caller of `sim::update`. The host
//! feeds it wall-clock time, intents and field measurements; two fixed-rate
//! clocks turn elapsed time into bullet and sweep ticks.

use crate::highscores::HighScores;
use crate::platform::field_width_or_default;
use crate::settings::Settings;
use crate::sim::{Event, GameEvent, GamePhase, GameState, Intent, update};

/// A periodic deadline on the session timeline
#[derive(Debug, Clone, Copy)]
struct FixedClock {
    interval_ms: f64,
    next_due_ms: f64,
}

impl FixedClock {
    fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            next_due_ms: interval_ms,
        }
    }

    fn is_due(&self, now_ms: f64) -> bool {
        self.next_due_ms <= now_ms
    }

    fn advance(&mut self) {
        self.next_due_ms += self.interval_ms;
    }

    /// Next tick one full interval after `now_ms`
    fn rearm(&mut self, now_ms: f64) {
        self.next_due_ms = now_ms + self.interval_ms;
    }
}

/// One game session
pub struct Session {
    state: GameState,
    high_scores: HighScores,
    settings: Settings,
    now_ms: f64,
    bullet_clock: FixedClock,
    sweep_clock: FixedClock,
    /// Events produced by the most recent `dispatch`, `resize` or `advance`
    last_events: Vec<GameEvent>,
    stopped: bool,
}

impl Session {
    /// Start a session on the title screen, reading the stored high score once
    pub fn new(settings: Settings, high_scores: HighScores, measured_width: Option<i32>) -> Self {
        let high_score = high_scores.get();
        let field_width = field_width_or_default(measured_width);
        log::info!(
            "Session created: field width {}, high score {}",
            field_width,
            high_score
        );
        Self {
            state: GameState::new(high_score, field_width),
            high_scores,
            bullet_clock: FixedClock::new(settings.bullet_interval_ms),
            sweep_clock: FixedClock::new(settings.sweep_interval_ms),
            settings,
            now_ms: 0.0,
            last_events: Vec::new(),
            stopped: false,
        }
    }

    /// Current snapshot, for rendering
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Events produced by the most recent call that changed the state
    pub fn last_events(&self) -> &[GameEvent] {
        &self.last_events
    }

    /// Apply a player intent immediately
    pub fn dispatch(&mut self, intent: Intent) {
        self.last_events.clear();
        self.apply(Event::Intent(intent));
    }

    /// The host measured the play field (None if it is not mounted yet)
    pub fn resize(&mut self, measured_width: Option<i32>) {
        self.last_events.clear();
        let width = field_width_or_default(measured_width);
        if width != self.state.field_width {
            log::debug!("Field width {} -> {}", self.state.field_width, width);
            self.apply(Event::Resize(width));
        }
    }

    /// Let `elapsed_ms` of wall-clock time pass. Returns the number of ticks run.
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        self.last_events.clear();
        if self.stopped || elapsed_ms.is_nan() || elapsed_ms <= 0.0 {
            return 0;
        }
        self.now_ms += elapsed_ms;

        if self.state.phase != GamePhase::Playing {
            self.rearm_clocks();
            return 0;
        }

        let mut ticks = 0;
        while self.state.phase == GamePhase::Playing {
            let bullet_due = self.bullet_clock.is_due(self.now_ms);
            let sweep_due = self.sweep_clock.is_due(self.now_ms);
            if !bullet_due && !sweep_due {
                break;
            }
            if ticks >= self.settings.max_catchup_ticks {
                log::debug!("Dropping tick backlog at {:.0} ms", self.now_ms);
                self.rearm_clocks();
                break;
            }

            // Earliest deadline first, bullets win ties
            let bullet_first = bullet_due
                && (!sweep_due || self.bullet_clock.next_due_ms <= self.sweep_clock.next_due_ms);
            if bullet_first {
                self.bullet_clock.advance();
                self.apply(Event::BulletTick);
            } else {
                self.sweep_clock.advance();
                self.apply(Event::SweepTick);
            }
            ticks += 1;
        }
        ticks
    }

    /// End the session; every later call is a no-op
    pub fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            log::info!("Session stopped");
        }
    }

    /// Single entry point for every state change
    fn apply(&mut self, event: Event) {
        if self.stopped {
            return;
        }
        let was_playing = self.state.phase == GamePhase::Playing;
        let step = update(&self.state, event);

        for game_event in &step.events {
            match game_event {
                GameEvent::Started => log::debug!("Game started"),
                GameEvent::InvaderDestroyed { invader_id } => {
                    log::debug!("Invader {} destroyed", invader_id)
                }
                GameEvent::LevelCleared { level } => log::debug!("Level {} cleared", level),
                GameEvent::GameOver { score } => log::debug!("Game over with {}", score),
                GameEvent::Victory { score } => log::debug!("Victory with {}", score),
                GameEvent::HighScore { score } => self.high_scores.set(*score),
                GameEvent::Reset => log::debug!("Back to the title screen"),
            }
        }
        self.last_events.extend(step.events);
        self.state = step.state;

        if !was_playing && self.state.phase == GamePhase::Playing {
            self.rearm_clocks();
        }
    }

    fn rearm_clocks(&mut self) {
        self.bullet_clock.rearm(self.now_ms);
        self.sweep_clock.rearm(self.now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn session() -> Session {
        let scores = HighScores::new(Box::new(MemoryStore::new()));
        Session::new(Settings::default(), scores, Some(600))
    }

    #[test]
    fn test_idle_until_started() {
        let mut s = session();
        assert_eq!(s.advance(5000.0), 0);
        assert_eq!(s.state().phase, GamePhase::Start);
    }

    #[test]
    fn test_cadences() {
        let mut s = session();
        s.dispatch(Intent::Start);
        s.dispatch(Intent::Fire);
        let x0 = s.state().invaders[0].pos.x;

        // 10 bullet ticks and one sweep tick in 500ms
        let mut ticks = 0;
        for _ in 0..10 {
            ticks += s.advance(50.0);
        }
        assert_eq!(ticks, 11);
        assert_eq!(s.state().bullets[0].pos.y, 380);
        assert_eq!(s.state().invaders[0].pos.x, x0 + 10);
    }

    #[test]
    fn test_catchup_is_capped() {
        let mut s = session();
        s.dispatch(Intent::Start);
        assert_eq!(s.advance(10_000.0), s.settings().max_catchup_ticks);
        // Backlog dropped: the next short frame runs nothing
        assert_eq!(s.advance(10.0), 0);
    }

    #[test]
    fn test_missing_width_uses_default() {
        let scores = HighScores::new(Box::new(MemoryStore::new()));
        let s = Session::new(Settings::default(), scores, None);
        assert_eq!(s.state().field_width, crate::consts::DEFAULT_FIELD_WIDTH);
    }

    #[test]
    fn test_resize_updates_field() {
        let mut s = session();
        s.resize(Some(420));
        assert_eq!(s.state().field_width, 420);
        s.resize(None);
        assert_eq!(s.state().field_width, 600);
    }

    #[test]
    fn test_game_events_reach_the_session() {
        let mut s = session();
        s.dispatch(Intent::Start);
        assert_eq!(s.last_events(), &[GameEvent::Started]);

        s.dispatch(Intent::Fire);
        let mut destroyed = Vec::new();
        for _ in 0..100 {
            s.advance(50.0);
            destroyed.extend(s.last_events().iter().filter_map(|e| match e {
                GameEvent::InvaderDestroyed { invader_id } => Some(*invader_id),
                _ => None,
            }));
            if !destroyed.is_empty() {
                break;
            }
        }
        assert_eq!(destroyed.len(), 1);
        assert_eq!(s.state().score, 100);
        assert!(s.state().invaders.iter().all(|i| i.id != destroyed[0]));

        // A call with nothing to report clears the previous batch
        s.resize(Some(600));
        assert!(s.last_events().is_empty());
    }

    #[test]
    fn test_stop_freezes_session() {
        let mut s = session();
        s.dispatch(Intent::Start);
        s.stop();
        let before = s.state().clone();
        s.dispatch(Intent::Fire);
        assert_eq!(s.advance(1000.0), 0);
        assert_eq!(s.state(), &before);
        assert!(s.is_stopped());
    }
}
