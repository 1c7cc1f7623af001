//! Enemy spawn policy
//!
//! Gated on active play, a cap on live (un-hit) enemies, and a minimum
//! spacing on the session clock since the previous spawn.

use glam::Vec2;
use rand::Rng;

use super::state::{Enemy, EntityId, GamePhase, GameState};
use crate::words::WordSource;

/// Why a spawn attempt did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnSkip {
    NotPlaying,
    TooSoon,
    AtCap,
    NoWord,
}

/// Try to spawn one enemy at `now`; skipped attempts are retried on the
/// next spawn-timer fire.
pub fn try_spawn(state: &mut GameState, words: &dyn WordSource, now: f64) -> Result<EntityId, SpawnSkip> {
    if state.phase != GamePhase::Playing {
        return Err(SpawnSkip::NotPlaying);
    }

    let elapsed = state.clock.elapsed(now);
    if elapsed < state.next_spawn_at {
        return Err(SpawnSkip::TooSoon);
    }

    let round = state.progress.round;
    let difficulty = state.progress.difficulty;
    let cap = state.tuning.max_enemies(round, difficulty);
    let live = state.live_enemies().count();
    if live >= cap {
        log::debug!("Spawn skipped: {} live enemies (cap {})", live, cap);
        return Err(SpawnSkip::AtCap);
    }

    let Some(word) = words.word_for_round(round, &state.recent_words, &mut state.rng) else {
        log::warn!("Word source returned nothing for round {}", round);
        return Err(SpawnSkip::NoWord);
    };
    state.recent_words.push(word.clone());

    let (min_x, max_x) = state.tuning.spawn_band();
    let x = if max_x > min_x {
        state.rng.random_range(min_x..max_x)
    } else {
        min_x
    };
    let speed = state.tuning.enemy_speed(round, difficulty);
    let id = state.next_entity_id();
    state
        .enemies
        .push(Enemy::new(id, word, Vec2::new(x, state.tuning.spawn_y), speed));
    state.next_spawn_at = elapsed + state.tuning.spawn_interval_ms(round, difficulty);

    Ok(id)
}
