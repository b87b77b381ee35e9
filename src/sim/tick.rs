//! Fixed-step physics update
//!
//! One call advances moving platforms, applies gravity, integrates the bunny,
//! damps horizontal motion and then resolves collisions.

use super::collision::{Contacts, check_collisions};
use super::state::{GameState, Phase};
use crate::config::EngineConfig;

/// Advance the game state by one step.
///
/// Returns `None` without touching anything unless the state is `Running`.
pub fn tick(state: &mut GameState, config: &EngineConfig) -> Option<Contacts> {
    if state.phase != Phase::Running {
        return None;
    }

    for platform in &mut state.moving_platforms {
        platform.step();
    }

    let bunny = &mut state.bunny;
    if !bunny.on_ground {
        bunny.vel.y += config.gravity;
    }
    bunny.pos += bunny.vel;
    // Exponential decay, never reaches exactly zero
    bunny.vel.x *= config.friction;

    state.ticks += 1;

    Some(check_collisions(state, config))
}
