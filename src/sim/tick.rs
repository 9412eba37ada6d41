//! State transition function
//!
//! `update` is the one way to change a `GameState`: it takes the current
//! snapshot and an event and returns the next snapshot together with what
//! happened. The helpers below mutate a private copy and are public so that
//! each rule can be tested on its own.

use super::collision::resolve_collisions;
use super::state::{GamePhase, GameState};
use crate::consts::*;

/// A normalized player action, independent of the device that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    Fire,
    /// Leave the title screen
    Start,
    /// Leave the end screen back to the title screen
    Replay,
}

/// Input to the transition function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Fast cadence: bullets move, collisions resolve
    BulletTick,
    /// Slow cadence: the formation sweeps
    SweepTick,
    Intent(Intent),
    /// The host measured a new field width
    Resize(i32),
}

/// Something noteworthy that happened during a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    InvaderDestroyed { invader_id: u32 },
    LevelCleared { level: u8 },
    GameOver { score: u32 },
    Victory { score: u32 },
    /// A new record that must be persisted
    HighScore { score: u32 },
    /// Back on the title screen
    Reset,
}

/// Result of one transition
#[derive(Debug, Clone)]
pub struct Step {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

/// Compute the next state for an event
pub fn update(state: &GameState, event: Event) -> Step {
    let mut next = state.clone();
    let mut events = Vec::new();

    match event {
        Event::BulletTick => {
            if next.phase == GamePhase::Playing {
                advance_bullets(&mut next);
                for hit in resolve_collisions(&mut next.bullets, &mut next.invaders) {
                    next.score += POINTS_PER_INVADER;
                    events.push(GameEvent::InvaderDestroyed {
                        invader_id: hit.invader_id,
                    });
                }
                check_phase(&mut next, &mut events);
            }
        }
        Event::SweepTick => {
            if next.phase == GamePhase::Playing {
                sweep_invaders(&mut next);
                check_phase(&mut next, &mut events);
            }
        }
        Event::Intent(intent) => apply_intent(&mut next, intent, &mut events),
        Event::Resize(width) => {
            next.field_width = width.max(0);
            next.nudge_player(0);
        }
    }

    Step {
        state: next,
        events,
    }
}

/// Move every bullet up one step and drop those that left the field
pub fn advance_bullets(state: &mut GameState) {
    for bullet in &mut state.bullets {
        bullet.pos.y -= BULLET_STEP;
    }
    state.bullets.retain(|b| b.pos.y > 0);
}

/// Returns true if the formation's next horizontal step would touch a wall
pub fn formation_at_edge(state: &GameState) -> bool {
    let dx = state.direction.sign() * INVADER_STEP_X;
    state.invaders.iter().any(|invader| {
        let next_x = invader.pos.x + dx;
        next_x <= 0 || next_x + INVADER_SIZE >= state.field_width
    })
}

/// One step of the lock-step sweep: either sideways, or reverse and drop
pub fn sweep_invaders(state: &mut GameState) {
    if formation_at_edge(state) {
        state.direction = state.direction.reversed();
        for invader in &mut state.invaders {
            invader.pos.y += INVADER_DROP;
        }
    } else {
        let dx = state.direction.sign() * INVADER_STEP_X;
        for invader in &mut state.invaders {
            invader.pos.x += dx;
        }
    }
}

/// Apply an intent; intents that make no sense in the current phase are ignored
pub fn apply_intent(state: &mut GameState, intent: Intent, events: &mut Vec<GameEvent>) {
    match (state.phase, intent) {
        (GamePhase::Playing, Intent::MoveLeft) => state.nudge_player(-PLAYER_STEP),
        (GamePhase::Playing, Intent::MoveRight) => state.nudge_player(PLAYER_STEP),
        (GamePhase::Playing, Intent::Fire) => state.spawn_bullet(),
        (GamePhase::Start, Intent::Start) => {
            begin_game(state);
            events.push(GameEvent::Started);
        }
        (GamePhase::GameOver | GamePhase::Victory, Intent::Replay) => {
            reset_to_title(state);
            events.push(GameEvent::Reset);
        }
        _ => {}
    }
}

/// Fresh run from level 1
pub fn begin_game(state: &mut GameState) {
    state.level = FIRST_LEVEL;
    state.score = 0;
    state.spawn_formation();
    state.phase = GamePhase::Playing;
    log::info!(
        "Game started: width {}, {} invaders",
        state.field_width,
        state.invaders.len()
    );
}

/// Back to the title screen without starting play
pub fn reset_to_title(state: &mut GameState) {
    state.score = 0;
    state.level = FIRST_LEVEL;
    state.bullets.clear();
    state.invaders.clear();
    state.center_player();
    state.phase = GamePhase::Start;
}

/// Terminal and level checks, run after every tick that moved something.
/// Reaching the bottom takes priority over clearing the formation.
pub fn check_phase(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.phase != GamePhase::Playing {
        return;
    }

    if state
        .invaders
        .iter()
        .any(|invader| invader.pos.y >= INVADER_BOTTOM_LIMIT)
    {
        state.phase = GamePhase::GameOver;
        log::info!("Game over at level {} with score {}", state.level, state.score);
        events.push(GameEvent::GameOver { score: state.score });
        if let Some(score) = state.record_high_score() {
            events.push(GameEvent::HighScore { score });
        }
        state.level = FIRST_LEVEL;
        return;
    }

    if state.invaders.is_empty() {
        events.push(GameEvent::LevelCleared { level: state.level });
        if state.level < FINAL_LEVEL {
            state.level += 1;
            state.spawn_formation();
            log::info!(
                "Level {} begins with {} invaders",
                state.level,
                state.invaders.len()
            );
        } else {
            state.phase = GamePhase::Victory;
            log::info!("Victory with score {}", state.score);
            events.push(GameEvent::Victory { score: state.score });
            if let Some(score) = state.record_high_score() {
                events.push(GameEvent::HighScore { score });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Bullet, Direction, Invader};
    use glam::IVec2;
    use proptest::prelude::*;

    fn playing(width: i32) -> GameState {
        let state = GameState::new(0, width);
        update(&state, Event::Intent(Intent::Start)).state
    }

    fn with_invaders(mut state: GameState, positions: &[(i32, i32)]) -> GameState {
        let invaders = positions
            .iter()
            .map(|&(x, y)| Invader {
                id: state.next_entity_id(),
                pos: IVec2::new(x, y),
            })
            .collect();
        state.invaders = invaders;
        state
    }

    #[test]
    fn test_start_intent_begins_level_one() {
        let state = GameState::new(300, 600);
        let step = update(&state, Event::Intent(Intent::Start));
        assert_eq!(step.state.phase, GamePhase::Playing);
        assert_eq!(step.state.level, 1);
        assert_eq!(step.state.score, 0);
        assert_eq!(step.state.invaders.len(), 21);
        assert_eq!(step.state.player_x, 275);
        assert_eq!(step.events, vec![GameEvent::Started]);
    }

    #[test]
    fn test_ticks_are_idle_outside_playing() {
        let mut state = GameState::new(0, 600);
        state.spawn_formation();
        state.spawn_bullet();
        for event in [Event::BulletTick, Event::SweepTick] {
            let step = update(&state, event);
            assert_eq!(step.state, state);
            assert!(step.events.is_empty());
        }
    }

    #[test]
    fn test_out_of_phase_intents_ignored() {
        let state = GameState::new(0, 600);
        for intent in [Intent::Fire, Intent::MoveLeft, Intent::MoveRight, Intent::Replay] {
            assert_eq!(update(&state, Event::Intent(intent)).state, state);
        }

        let game = playing(600);
        for intent in [Intent::Start, Intent::Replay] {
            assert_eq!(update(&game, Event::Intent(intent)).state, game);
        }
    }

    #[test]
    fn test_fire_spawns_at_gun() {
        let mut state = playing(600);
        state.player_x = 20;
        let step = update(&state, Event::Intent(Intent::Fire));
        let bullet = step.state.bullets.last().copied();
        assert_eq!(bullet.map(|b| b.pos), Some(IVec2::new(35, 480)));
    }

    #[test]
    fn test_move_intents_step_and_clamp() {
        let mut state = playing(600);
        state.player_x = 10;
        let state = update(&state, Event::Intent(Intent::MoveLeft)).state;
        assert_eq!(state.player_x, 0);
        let state = update(&state, Event::Intent(Intent::MoveRight)).state;
        assert_eq!(state.player_x, 20);
    }

    #[test]
    fn test_bullets_leave_top() {
        let mut state = playing(600);
        state.invaders.clear();
        state.bullets = vec![
            Bullet {
                id: 900,
                pos: IVec2::new(300, 10),
            },
            Bullet {
                id: 901,
                pos: IVec2::new(300, 11),
            },
        ];
        advance_bullets(&mut state);
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.bullets[0].pos.y, 1);
    }

    #[test]
    fn test_sweep_moves_sideways() {
        let state = with_invaders(playing(600), &[(20, 20), (100, 20)]);
        let next = update(&state, Event::SweepTick).state;
        assert_eq!(next.invaders[0].pos, IVec2::new(30, 20));
        assert_eq!(next.invaders[1].pos, IVec2::new(110, 20));
        assert_eq!(next.direction, Direction::Right);
    }

    #[test]
    fn test_sweep_reverses_and_drops_at_edge() {
        // 550 + 10 + 40 touches the right wall of a 600 field
        let state = with_invaders(playing(600), &[(20, 20), (550, 20)]);
        let next = update(&state, Event::SweepTick).state;
        assert_eq!(next.direction, Direction::Left);
        assert_eq!(next.invaders[0].pos, IVec2::new(20, 40));
        assert_eq!(next.invaders[1].pos, IVec2::new(550, 40));

        // Next sweep goes left
        let next = update(&next, Event::SweepTick).state;
        assert_eq!(next.invaders[0].pos, IVec2::new(10, 40));
    }

    #[test]
    fn test_sweep_reverses_at_left_wall() {
        let mut state = with_invaders(playing(600), &[(10, 20)]);
        state.direction = Direction::Left;
        let next = update(&state, Event::SweepTick).state;
        assert_eq!(next.direction, Direction::Right);
        assert_eq!(next.invaders[0].pos, IVec2::new(10, 40));
    }

    #[test]
    fn test_hit_awards_points() {
        let mut state = with_invaders(playing(600), &[(20, 20), (300, 20)]);
        state.bullets = vec![Bullet {
            id: 900,
            pos: IVec2::new(35, 70),
        }];
        let step = update(&state, Event::BulletTick);
        assert_eq!(step.state.score, 100);
        assert_eq!(step.state.invaders.len(), 1);
        assert!(step.state.bullets.is_empty());
        assert!(matches!(
            step.events.as_slice(),
            [GameEvent::InvaderDestroyed { .. }]
        ));
    }

    #[test]
    fn test_clearing_level_one_advances() {
        let mut state = with_invaders(playing(600), &[(20, 20)]);
        state.score = 2000;
        state.bullets = vec![Bullet {
            id: 900,
            pos: IVec2::new(30, 40),
        }];
        let step = update(&state, Event::BulletTick);
        assert_eq!(step.state.phase, GamePhase::Playing);
        assert_eq!(step.state.level, 2);
        assert_eq!(step.state.score, 2100);
        assert_eq!(step.state.invaders.len(), 28);
        assert!(step.events.contains(&GameEvent::LevelCleared { level: 1 }));
        assert!(!step.events.iter().any(|e| matches!(e, GameEvent::Victory { .. })));
    }

    #[test]
    fn test_clearing_level_two_is_victory() {
        let mut state = with_invaders(playing(600), &[(20, 20)]);
        state.level = 2;
        state.high_score = 50;
        state.bullets = vec![Bullet {
            id: 900,
            pos: IVec2::new(30, 40),
        }];
        let step = update(&state, Event::BulletTick);
        assert_eq!(step.state.phase, GamePhase::Victory);
        assert_eq!(step.state.high_score, 100);
        assert!(step.events.contains(&GameEvent::HighScore { score: 100 }));
    }

    #[test]
    fn test_reaching_bottom_is_game_over() {
        // At the right wall, so this sweep drops it onto the bottom line
        let mut state = with_invaders(playing(600), &[(550, 420)]);
        state.level = 2;
        state.score = 400;
        state.high_score = 1000;
        let step = update(&state, Event::SweepTick);
        assert_eq!(step.state.phase, GamePhase::GameOver);
        assert_eq!(step.state.level, 1);
        assert_eq!(step.state.high_score, 1000);
        assert_eq!(step.events, vec![GameEvent::GameOver { score: 400 }]);
    }

    #[test]
    fn test_game_over_records_beaten_high_score() {
        let mut state = with_invaders(playing(600), &[(300, INVADER_BOTTOM_LIMIT)]);
        state.score = 1200;
        state.high_score = 1000;
        let mut events = Vec::new();
        check_phase(&mut state, &mut events);
        assert_eq!(state.high_score, 1200);
        assert!(events.contains(&GameEvent::HighScore { score: 1200 }));
    }

    #[test]
    fn test_bottom_wins_over_empty_check() {
        // Bullet kills one invader while another sits on the bottom line
        let mut state = with_invaders(playing(600), &[(20, 20), (300, 440)]);
        state.bullets = vec![Bullet {
            id: 900,
            pos: IVec2::new(30, 40),
        }];
        let step = update(&state, Event::BulletTick);
        assert_eq!(step.state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_replay_returns_to_title() {
        let mut state = playing(600);
        state.phase = GamePhase::Victory;
        state.score = 900;
        state.level = 2;
        let step = update(&state, Event::Intent(Intent::Replay));
        assert_eq!(step.state.phase, GamePhase::Start);
        assert_eq!(step.state.score, 0);
        assert_eq!(step.state.level, 1);
        assert!(step.state.invaders.is_empty());
        assert_eq!(step.events, vec![GameEvent::Reset]);
    }

    #[test]
    fn test_resize_clamps_player() {
        let mut state = playing(600);
        state.player_x = 550;
        let step = update(&state, Event::Resize(400));
        assert_eq!(step.state.field_width, 400);
        assert_eq!(step.state.player_x, 350);
    }

    #[test]
    fn test_negative_resize_then_start() {
        let state = GameState::new(0, 600);
        let state = update(&state, Event::Resize(i32::MIN + 10)).state;
        assert_eq!(state.field_width, 0);
        assert_eq!(state.player_x, 0);

        let state = update(&state, Event::Intent(Intent::Start)).state;
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.invaders.len(), 3);
        assert_eq!(state.player_x, 0);
    }

    proptest! {
        #[test]
        fn bullets_climb_by_fixed_step(ys in proptest::collection::vec(1i32..500, 0..20)) {
            let mut state = playing(600);
            state.invaders.clear();
            state.invaders.push(Invader {
                id: 999,
                pos: IVec2::new(-1000, -1000),
            });
            state.bullets = ys
                .iter()
                .enumerate()
                .map(|(i, &y)| Bullet {
                    id: 1000 + i as u32,
                    pos: IVec2::new(300, y),
                })
                .collect();

            let next = update(&state, Event::BulletTick).state;
            let expected: Vec<i32> = ys
                .iter()
                .map(|y| y - BULLET_STEP)
                .filter(|y| *y > 0)
                .collect();
            let actual: Vec<i32> = next.bullets.iter().map(|b| b.pos.y).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn sweep_is_either_sideways_or_drop(
            xs in proptest::collection::vec(0i32..560, 1..12),
            left in any::<bool>(),
        ) {
            let positions: Vec<(i32, i32)> = xs.iter().map(|&x| (x, 40)).collect();
            let mut state = with_invaders(playing(600), &positions);
            state.direction = if left { Direction::Left } else { Direction::Right };
            let at_edge = formation_at_edge(&state);

            let next = update(&state, Event::SweepTick).state;
            for (before, after) in state.invaders.iter().zip(&next.invaders) {
                if at_edge {
                    prop_assert_eq!(after.pos, before.pos + IVec2::new(0, INVADER_DROP));
                } else {
                    let dx = state.direction.sign() * INVADER_STEP_X;
                    prop_assert_eq!(after.pos, before.pos + IVec2::new(dx, 0));
                }
            }
            prop_assert_eq!(next.direction == state.direction, !at_edge);
        }
    }
}
