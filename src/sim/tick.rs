//! Variable-rate frame tick
//!
//! Advances descent, floor crossings and projectiles by the wall-clock delta
//! since the previous frame, normalised to nominal 60 Hz frames and clamped
//! so a stalled tab cannot teleport enemies to the floor.

use super::damage;
use super::state::{GamePhase, GameState};
use crate::tuning::Tuning;

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// Nominal frames advanced
    pub delta: f32,
    /// Enemies that reached the floor
    pub crossed: u32,
    /// Projectiles that landed
    pub landed: u32,
}

/// Nominal frames elapsed between `last` and `now`, clamped to
/// `[0, max_frame_delta]`
pub fn frame_delta(tuning: &Tuning, last: Option<f64>, now: f64) -> f32 {
    let Some(last) = last else {
        return 0.0;
    };
    let frames = ((now - last) / tuning.frame_ms) as f32;
    frames.clamp(0.0, tuning.max_frame_delta)
}

/// Advance the simulation to host time `now`.
///
/// Returns None when nothing moved (not in play). While paused only the
/// delta anchor follows the clock, so resuming never produces a jump.
pub fn tick(state: &mut GameState, now: f64) -> Option<TickReport> {
    match state.phase {
        GamePhase::Paused => {
            state.last_frame_at = Some(now);
            return None;
        }
        GamePhase::Playing => {}
        _ => return None,
    }

    let delta = frame_delta(&state.tuning, state.last_frame_at, now);
    state.last_frame_at = Some(now);

    for enemy in state.enemies.iter_mut().filter(|e| !e.is_hit) {
        enemy.pos.y += enemy.speed * delta;
    }

    let crossed = damage::resolve_floor_crossings(state, now);
    if state.phase != GamePhase::Playing {
        return Some(TickReport {
            delta,
            crossed,
            landed: 0,
        });
    }

    let landed = damage::resolve_impacts(state);
    Some(TickReport {
        delta,
        crossed,
        landed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::progression;
    use crate::sim::state::{Enemy, EntityId};
    use crate::tuning::Difficulty;
    use glam::Vec2;
    use proptest::prelude::*;

    fn playing_state() -> GameState {
        let mut state = GameState::new(Tuning::default(), 4, 9);
        progression::start(&mut state, 1, Difficulty::Normal, 0.0);
        state
    }

    fn add_enemy(state: &mut GameState, word: &str, y: f32, speed: f32) -> EntityId {
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, word, Vec2::new(300.0, y), speed));
        id
    }

    #[test]
    fn test_delta_is_normalised_and_clamped() {
        let tuning = Tuning::default();
        assert_eq!(frame_delta(&tuning, None, 100.0), 0.0);
        assert!((frame_delta(&tuning, Some(0.0), 16.67) - 1.0).abs() < 1e-5);
        assert!((frame_delta(&tuning, Some(0.0), 25.005) - 1.5).abs() < 1e-4);
        assert_eq!(frame_delta(&tuning, Some(0.0), 10_000.0), 3.0);
        assert_eq!(frame_delta(&tuning, Some(100.0), 50.0), 0.0);
    }

    #[test]
    fn test_enemies_descend_by_speed_times_delta() {
        let mut state = playing_state();
        let id = add_enemy(&mut state, "अब", 100.0, 2.0);
        let report = tick(&mut state, 16.67).unwrap();
        assert!((report.delta - 1.0).abs() < 1e-5);
        assert!((state.enemy(id).unwrap().pos.y - 102.0).abs() < 1e-3);
    }

    #[test]
    fn test_long_stall_moves_at_most_three_frames() {
        let mut state = playing_state();
        let id = add_enemy(&mut state, "अब", 100.0, 2.0);
        tick(&mut state, 5_000.0);
        assert_eq!(state.enemy(id).unwrap().pos.y, 106.0);
    }

    #[test]
    fn test_hit_enemies_freeze() {
        let mut state = playing_state();
        let id = add_enemy(&mut state, "अब", 100.0, 2.0);
        state.enemy_mut(id).unwrap().is_hit = true;
        tick(&mut state, 16.67);
        assert_eq!(state.enemy(id).unwrap().pos.y, 100.0);
    }

    #[test]
    fn test_pause_freezes_and_resume_does_not_jump() {
        let mut state = playing_state();
        let id = add_enemy(&mut state, "अब", 100.0, 1.0);
        progression::pause(&mut state, 0.0);
        assert!(tick(&mut state, 20_000.0).is_none());
        assert_eq!(state.enemy(id).unwrap().pos.y, 100.0);

        progression::resume(&mut state, 40_000.0);
        tick(&mut state, 40_000.0 + 16.67);
        assert!((state.enemy(id).unwrap().pos.y - 101.0).abs() < 1e-3);
    }

    #[test]
    fn test_floor_crossing_drops_lock() {
        let mut state = playing_state();
        let floor = state.tuning.floor_y();
        let id = add_enemy(&mut state, "अब", floor - 0.5, 1.0);
        state.typing.buffer = "अ".into();
        state.typing.active_target = Some(id);

        let report = tick(&mut state, 16.67).unwrap();
        assert_eq!(report.crossed, 1);
        assert_eq!(state.progress.lives, 4);
        assert!(state.enemy(id).is_none());
        assert!(state.typing.buffer.is_empty());
        assert_eq!(state.typing.active_target, None);
    }

    #[test]
    fn test_last_life_ends_game_and_motion() {
        let mut state = playing_state();
        state.progress.lives = 1;
        let floor = state.tuning.floor_y();
        add_enemy(&mut state, "अब", floor, 1.0);
        let survivor = add_enemy(&mut state, "कब", 100.0, 1.0);

        tick(&mut state, 16.67);
        assert_eq!(state.phase, GamePhase::GameOver);
        let y = state.enemy(survivor).unwrap().pos.y;

        assert!(tick(&mut state, 100.0).is_none());
        assert_eq!(state.enemy(survivor).unwrap().pos.y, y);
    }

    #[test]
    fn test_same_seed_same_run() {
        let words = crate::words::WordPool::builtin().unwrap();
        let run = || {
            let mut state = playing_state();
            let mut now = 0.0;
            for _ in 0..600 {
                now += 16.67;
                let _ = crate::sim::spawn::try_spawn(&mut state, &words, now);
                tick(&mut state, now);
            }
            state
                .enemies
                .iter()
                .map(|e| (e.word.clone(), e.pos))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    proptest! {
        #[test]
        fn prop_descent_is_monotonic(
            steps in proptest::collection::vec(0.0f64..200.0, 1..40),
            speed in 0.1f32..3.0,
        ) {
            let mut state = playing_state();
            let id = add_enemy(&mut state, "अब", -50.0, speed);
            let mut now = 0.0;
            for step in steps {
                let before = state.enemy(id).map(|e| e.pos.y);
                now += step;
                let Some(report) = tick(&mut state, now) else { break };
                match (before, state.enemy(id)) {
                    (Some(y0), Some(enemy)) => {
                        prop_assert!(enemy.pos.y >= y0);
                        prop_assert!((enemy.pos.y - y0 - speed * report.delta).abs() < 1e-3);
                        prop_assert!(report.delta <= 3.0);
                    }
                    _ => break,
                }
            }
        }
    }
}
