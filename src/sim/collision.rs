//! Bullet/invader collision resolution
//!
//! Point-in-box tests against each invader's inclusive hit box. Every bullet
//! takes at most one invader per tick, the first in formation order that is
//! still alive.

use super::state::{Bullet, Invader};

/// A resolved bullet/invader pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub bullet_id: u32,
    pub invader_id: u32,
}

/// Find the first live invader hit by a bullet
fn first_hit<'a>(bullet: &Bullet, invaders: &'a [Invader], dead: &[u32]) -> Option<&'a Invader> {
    invaders
        .iter()
        .find(|invader| !dead.contains(&invader.id) && invader.contains(bullet.pos))
}

/// Remove every bullet that hit something and the invader it hit.
///
/// Bullets are resolved oldest first. Survivors keep their relative order.
/// Returns the hits in resolution order.
pub fn resolve_collisions(bullets: &mut Vec<Bullet>, invaders: &mut Vec<Invader>) -> Vec<Hit> {
    let mut hits: Vec<Hit> = Vec::new();
    let mut dead_invaders: Vec<u32> = Vec::new();

    for bullet in bullets.iter() {
        if let Some(invader) = first_hit(bullet, invaders, &dead_invaders) {
            dead_invaders.push(invader.id);
            hits.push(Hit {
                bullet_id: bullet.id,
                invader_id: invader.id,
            });
        }
    }

    if !hits.is_empty() {
        bullets.retain(|b| !hits.iter().any(|h| h.bullet_id == b.id));
        invaders.retain(|i| !dead_invaders.contains(&i.id));
    }

    hits
}
