//! Game state and core simulation types
//!
//! One `GameState` is the whole session: the driver replaces it wholesale on
//! every tick or intent and the renderer only ever reads it.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::formation::generate_formation;
use crate::consts::*;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for any input
    Start,
    /// Active gameplay (the only phase in which ticks do anything)
    Playing,
    /// An invader reached the bottom
    GameOver,
    /// Final level cleared
    Victory,
}

impl GamePhase {
    /// GameOver and Victory only leave through an explicit replay
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }
}

/// Horizontal sweep direction of the formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    pub fn sign(&self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// A player projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: IVec2,
}

/// An enemy sprite (top-left corner, `INVADER_SIZE` square)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invader {
    pub id: u32,
    pub pos: IVec2,
}

impl Invader {
    /// Inclusive hit test against a point
    pub fn contains(&self, point: IVec2) -> bool {
        point.x >= self.pos.x
            && point.x <= self.pos.x + INVADER_SIZE
            && point.y >= self.pos.y
            && point.y <= self.pos.y + INVADER_SIZE
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// Left edge of the player ship
    pub player_x: i32,
    /// Live bullets, oldest first
    pub bullets: Vec<Bullet>,
    /// The current formation
    pub invaders: Vec<Invader>,
    pub direction: Direction,
    pub score: u32,
    pub high_score: u32,
    pub level: u8,
    /// Measured play-field width, owned by the host
    pub field_width: i32,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a session on the title screen. Negative widths count as 0.
    pub fn new(high_score: u32, field_width: i32) -> Self {
        let mut state = Self {
            phase: GamePhase::Start,
            player_x: 0,
            bullets: Vec::new(),
            invaders: Vec::new(),
            direction: Direction::Right,
            score: 0,
            high_score,
            level: FIRST_LEVEL,
            field_width: field_width.max(0),
            next_id: 1,
        };
        state.center_player();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Largest legal `player_x` for the current field
    pub fn player_max_x(&self) -> i32 {
        self.field_width.saturating_sub(PLAYER_WIDTH).max(0)
    }

    pub fn center_player(&mut self) {
        self.player_x = self.player_max_x() / 2;
    }

    /// Move the player by `dx`, keeping the ship inside the field
    pub fn nudge_player(&mut self, dx: i32) {
        self.player_x = (self.player_x + dx).clamp(0, self.player_max_x());
    }

    /// Fire from the ship's gun
    pub fn spawn_bullet(&mut self) {
        let id = self.next_entity_id();
        self.bullets.push(Bullet {
            id,
            pos: IVec2::new(self.player_x + PLAYER_GUN_OFFSET, BULLET_SPAWN_Y),
        });
    }

    /// Replace the formation with a fresh one for the current level and
    /// put the player back at the start line
    pub fn spawn_formation(&mut self) {
        let positions = generate_formation(self.field_width, self.level);
        let mut invaders = Vec::with_capacity(positions.len());
        for pos in positions {
            invaders.push(Invader {
                id: self.next_entity_id(),
                pos,
            });
        }
        self.invaders = invaders;
        self.bullets.clear();
        self.direction = Direction::Right;
        self.center_player();
    }

    /// Raise the high score if this run beat it; returns the new record
    pub fn record_high_score(&mut self) -> Option<u32> {
        if self.score > self.high_score {
            self.high_score = self.score;
            Some(self.score)
        } else {
            None
        }
    }
}
