//! Deterministic game core
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Integer positions, fixed steps per tick
//! - Stable iteration order (formation order, firing order)
//! - No rendering, storage or platform dependencies

pub mod collision;
pub mod formation;
pub mod state;
pub mod tick;

pub use collision::{Hit, resolve_collisions};
pub use formation::{FormationLayout, generate_formation};
pub use state::{Bullet, Direction, GamePhase, GameState, Invader};
pub use tick::{Event, GameEvent, Intent, Step, update};
