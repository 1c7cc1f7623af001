//! Word completion, floor crossings and projectile impacts

use super::progression;
use super::state::{EntityId, Explosion, GamePhase, GameState, Projectile};
use crate::consts::POINTS_PER_GRAPHEME;

/// Points for a completed word of `graphemes` units
pub fn word_points(graphemes: usize, round: u32, difficulty_rank: u32) -> u64 {
    graphemes as u64 * POINTS_PER_GRAPHEME * round as u64 * difficulty_rank as u64
}

/// Resolve a completed word: freeze the enemy, fire at it, and credit the
/// score right away (not on impact). Returns the projectile id, or None if
/// the enemy is gone or already hit.
pub fn complete_word(state: &mut GameState, enemy_id: EntityId, now: f64) -> Option<EntityId> {
    let start = state.tuning.player_pos();
    let enemy = state.enemy_mut(enemy_id).filter(|e| !e.is_hit)?;
    enemy.is_hit = true;
    let target = enemy.pos;
    let graphemes = enemy.graphemes;

    let projectile_id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id: projectile_id,
        start,
        target,
        target_enemy: enemy_id,
        progress: 0.0,
    });

    let progress = &mut state.progress;
    let points = word_points(graphemes, progress.round, progress.difficulty.rank());
    progress.score += points;
    progress.words_destroyed += 1;
    progress.difficulty_progress += 1;
    state.sounds.word_complete += 1;
    log::debug!("Word {} destroyed (+{} points)", enemy_id, points);

    if state.progress.difficulty_progress >= state.words_per_difficulty() {
        progression::advance_difficulty(state, now);
    }

    Some(projectile_id)
}

/// Remove un-hit enemies at or past the floor, charging one life each.
/// Returns how many crossed this tick.
pub fn resolve_floor_crossings(state: &mut GameState, now: f64) -> u32 {
    let floor = state.tuning.floor_y();
    let crossed: Vec<EntityId> = state
        .live_enemies()
        .filter(|e| e.pos.y >= floor)
        .map(|e| e.id)
        .collect();
    if crossed.is_empty() {
        return 0;
    }

    for id in &crossed {
        state.remove_enemy(*id);
    }

    let count = crossed.len() as u32;
    state.progress.lives = state.progress.lives.saturating_sub(count);
    state.sounds.life_lost += 1;
    log::debug!("{} enemies reached the floor, {} lives left", count, state.progress.lives);

    if state.progress.lives == 0 && state.phase == GamePhase::Playing {
        progression::game_over(state, now);
    }
    count
}

/// Advance projectiles; landed ones leave an explosion and take their enemy
/// with them. Returns how many landed this tick.
pub fn resolve_impacts(state: &mut GameState) -> u32 {
    let step = state.tuning.projectile_step;
    for projectile in &mut state.projectiles {
        projectile.progress += step;
    }

    let (landed, flying): (Vec<Projectile>, Vec<Projectile>) = std::mem::take(&mut state.projectiles)
        .into_iter()
        .partition(|p| p.progress >= 1.0);
    state.projectiles = flying;

    for projectile in &landed {
        let id = state.next_entity_id();
        state.explosions.push(Explosion {
            id,
            pos: projectile.target,
        });
        // Already gone if the tier was reset mid-flight
        state.remove_enemy(projectile.target_enemy);
    }
    landed.len() as u32
}
