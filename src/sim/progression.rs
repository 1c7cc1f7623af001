//! Game flow: round select, difficulty tiers, pause, round/game completion
//!
//! ```text
//! round-select -> difficulty-select -> playing <-> paused
//! playing -> round-complete -> playing (next round) | game-complete
//! playing -> game-over -> playing (retry) | round-select
//! ```
//!
//! Fresh starts (`start`, `retry_round`, `restart_from_current_difficulty`)
//! reset the score. `continue_to_next_round` keeps score, word totals,
//! keystroke counters and the session clock.

use super::state::{GamePhase, GameState, TypingState};
use crate::tuning::Difficulty;

/// Pick a round and move on to choosing a difficulty
pub fn select_round(state: &mut GameState, round: u32) -> bool {
    if !matches!(state.phase, GamePhase::RoundSelect | GamePhase::DifficultySelect) {
        return false;
    }
    state.progress.round = round.clamp(1, state.total_rounds);
    state.phase = GamePhase::DifficultySelect;
    true
}

/// Start a fresh run of `round` at `difficulty`; resets score and stats
pub fn start(state: &mut GameState, round: u32, difficulty: Difficulty, now: f64) {
    state.progress.score = 0;
    state.progress.words_destroyed = 0;
    state.typing = TypingState::default();
    state.recent_words.clear();
    state.clock.start(now);
    begin_round(state, round, difficulty, now);
    log::info!(
        "Starting round {} at {} difficulty",
        state.progress.round,
        difficulty.as_str()
    );
}

/// Start at the chosen difficulty after `select_round`
pub fn start_selected(state: &mut GameState, difficulty: Difficulty, now: f64) -> bool {
    if state.phase != GamePhase::DifficultySelect {
        return false;
    }
    let round = state.progress.round;
    start(state, round, difficulty, now);
    true
}

/// Pick a round and start it in one step, from the selection screens only
pub fn select_round_and_start(
    state: &mut GameState,
    round: u32,
    difficulty: Difficulty,
    now: f64,
) -> bool {
    if !matches!(state.phase, GamePhase::RoundSelect | GamePhase::DifficultySelect) {
        return false;
    }
    start(state, round, difficulty, now);
    true
}

/// Per-round resets shared by every way into `Playing`
fn begin_round(state: &mut GameState, round: u32, difficulty: Difficulty, now: f64) {
    state.progress.round = round.clamp(1, state.total_rounds);
    state.progress.difficulty = difficulty;
    state.progress.difficulty_progress = 0;
    state.progress.lives = state.tuning.max_lives(difficulty);
    state.enemies.clear();
    state.projectiles.clear();
    state.explosions.clear();
    state.typing.clear_entry();
    state.difficulty_up_notice = false;
    state.last_frame_at = Some(now);
    state.next_spawn_at = state.clock.elapsed(now) + state.tuning.first_spawn_delay_ms;
    state.phase = GamePhase::Playing;
}

/// Freeze the simulation; the buffer and lock are kept
pub fn pause(state: &mut GameState, now: f64) -> bool {
    if state.phase != GamePhase::Playing {
        return false;
    }
    state.clock.suspend(now);
    state.phase = GamePhase::Paused;
    log::info!("Paused");
    true
}

/// Leave pause; the next tick measures its delta from `now`
pub fn resume(state: &mut GameState, now: f64) -> bool {
    if state.phase != GamePhase::Paused {
        return false;
    }
    state.clock.resume(now);
    state.last_frame_at = Some(now);
    state.phase = GamePhase::Playing;
    log::info!("Resumed");
    true
}

/// Escape key: pause while playing, resume while paused
pub fn toggle_pause(state: &mut GameState, now: f64) -> bool {
    match state.phase {
        GamePhase::Playing => pause(state, now),
        GamePhase::Paused => resume(state, now),
        _ => false,
    }
}

/// Switch tier from the pause menu (practice): fresh field, full lives,
/// score kept, play resumes
pub fn change_difficulty(state: &mut GameState, difficulty: Difficulty, now: f64) -> bool {
    if state.phase != GamePhase::Paused {
        return false;
    }
    enter_difficulty(state, difficulty, now);
    resume(state, now);
    log::info!("Difficulty changed to {}", difficulty.as_str());
    true
}

/// Tier quota reached: promote, or complete the round at the last tier
pub fn advance_difficulty(state: &mut GameState, now: f64) {
    match state.progress.difficulty.next() {
        Some(next) => {
            enter_difficulty(state, next, now);
            state.difficulty_up_notice = true;
            log::info!(
                "Round {}: promoted to {} difficulty",
                state.progress.round,
                next.as_str()
            );
        }
        None => complete_round(state, now),
    }
}

fn enter_difficulty(state: &mut GameState, difficulty: Difficulty, now: f64) {
    state.progress.difficulty = difficulty;
    state.progress.difficulty_progress = 0;
    state.progress.lives = state.tuning.max_lives(difficulty);
    state.clear_field();
    state.next_spawn_at = state.clock.elapsed(now) + state.tuning.first_spawn_delay_ms;
}

fn complete_round(state: &mut GameState, now: f64) {
    state.clock.suspend(now);
    state.typing.clear_entry();
    state.sounds.round_complete += 1;
    state.phase = GamePhase::RoundComplete;
    log::info!(
        "Round {} complete (score {})",
        state.progress.round,
        state.progress.score
    );
}

/// Out of lives
pub fn game_over(state: &mut GameState, now: f64) {
    state.clock.suspend(now);
    state.typing.clear_entry();
    state.phase = GamePhase::GameOver;
    log::info!(
        "Game over in round {} (score {}, {} words)",
        state.progress.round,
        state.progress.score,
        state.progress.words_destroyed
    );
}

/// Move on from a completed round, keeping the run's score and stats
pub fn continue_to_next_round(state: &mut GameState, now: f64) -> bool {
    if state.phase != GamePhase::RoundComplete {
        return false;
    }
    if state.progress.round >= state.total_rounds {
        state.phase = GamePhase::GameComplete;
        log::info!("All {} rounds complete (score {})", state.total_rounds, state.progress.score);
        return true;
    }
    let round = state.progress.round + 1;
    state.clock.resume(now);
    begin_round(state, round, Difficulty::Beginner, now);
    log::info!("Continuing to round {}", round);
    true
}

/// Replay the current round from the easiest tier
pub fn retry_round(state: &mut GameState, now: f64) -> bool {
    if !can_restart(state.phase) {
        return false;
    }
    let round = state.progress.round;
    start(state, round, Difficulty::Beginner, now);
    true
}

/// Replay the current round from the current tier
pub fn restart_from_current_difficulty(state: &mut GameState, now: f64) -> bool {
    if !can_restart(state.phase) {
        return false;
    }
    let round = state.progress.round;
    let difficulty = state.progress.difficulty;
    start(state, round, difficulty, now);
    true
}

fn can_restart(phase: GamePhase) -> bool {
    matches!(
        phase,
        GamePhase::Playing | GamePhase::Paused | GamePhase::RoundComplete | GamePhase::GameOver
    )
}

/// Abandon the session and go back to round select
pub fn go_to_round_select(state: &mut GameState, now: f64) {
    state.clock.suspend(now);
    state.enemies.clear();
    state.projectiles.clear();
    state.explosions.clear();
    state.typing.clear_entry();
    state.difficulty_up_notice = false;
    state.last_frame_at = None;
    state.phase = GamePhase::RoundSelect;
}

/// The view finished showing the promotion banner
pub fn hide_difficulty_up(state: &mut GameState) {
    state.difficulty_up_notice = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::damage::complete_word;
    use crate::sim::state::Enemy;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn new_state() -> GameState {
        let mut tuning = Tuning::default();
        tuning.words_per_difficulty = 2;
        GameState::new(tuning, 2, 3)
    }

    /// Spawn and complete one word
    fn destroy_one(state: &mut GameState, now: f64) {
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, "अब", Vec2::new(200.0, 100.0), 1.0));
        complete_word(state, id, now);
    }

    #[test]
    fn test_round_then_difficulty_select() {
        let mut state = new_state();
        assert!(select_round(&mut state, 2));
        assert_eq!(state.phase, GamePhase::DifficultySelect);
        assert_eq!(state.progress.round, 2);

        assert!(start_selected(&mut state, Difficulty::Normal, 0.0));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.progress.difficulty, Difficulty::Normal);
        assert_eq!(state.progress.lives, 5);
    }

    #[test]
    fn test_select_round_clamps() {
        let mut state = new_state();
        select_round(&mut state, 99);
        assert_eq!(state.progress.round, 2);
    }

    #[test]
    fn test_start_resets_run() {
        let mut state = new_state();
        start(&mut state, 1, Difficulty::Beginner, 0.0);
        state.progress.score = 500;
        state.typing.total_chars = 9;
        start(&mut state, 1, Difficulty::Beginner, 10.0);
        assert_eq!(state.progress.score, 0);
        assert_eq!(state.typing.total_chars, 0);
        assert_eq!(state.progress.lives, 7);
        assert_eq!(state.last_frame_at, Some(10.0));
    }

    #[test]
    fn test_pause_keeps_buffer_and_lock() {
        let mut state = new_state();
        start(&mut state, 1, Difficulty::Beginner, 0.0);
        state.typing.buffer = "अ".into();
        state.typing.active_target = Some(77);

        assert!(toggle_pause(&mut state, 100.0));
        assert_eq!(state.phase, GamePhase::Paused);
        assert_eq!(state.typing.buffer, "अ");
        assert_eq!(state.typing.active_target, Some(77));

        assert!(toggle_pause(&mut state, 5_000.0));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.last_frame_at, Some(5_000.0));
        assert_eq!(state.clock.elapsed(5_000.0), 100.0);
    }

    #[test]
    fn test_pause_only_from_playing() {
        let mut state = new_state();
        assert!(!pause(&mut state, 0.0));
        assert!(!resume(&mut state, 0.0));
        assert_eq!(state.phase, GamePhase::RoundSelect);
    }

    #[test]
    fn test_tier_quota_promotes() {
        let mut state = new_state();
        start(&mut state, 1, Difficulty::Beginner, 0.0);
        state.progress.lives = 3;
        destroy_one(&mut state, 0.0);
        let survivor = state.next_entity_id();
        state.enemies.push(Enemy::new(survivor, "कब", Vec2::new(400.0, 50.0), 1.0));
        let score_before = state.progress.score;

        destroy_one(&mut state, 0.0);
        // Only the completing word's points; promotion itself leaves score alone
        assert_eq!(state.progress.score, score_before + 200);

        assert_eq!(state.progress.difficulty, Difficulty::Normal);
        assert_eq!(state.progress.difficulty_progress, 0);
        assert_eq!(state.progress.lives, 5);
        assert!(state.enemies.is_empty());
        assert!(state.difficulty_up_notice);
        assert_eq!(state.progress.words_destroyed, 2);
        assert_eq!(state.phase, GamePhase::Playing);

        hide_difficulty_up(&mut state);
        assert!(!state.difficulty_up_notice);
    }

    #[test]
    fn test_last_tier_quota_completes_round() {
        let mut state = new_state();
        start(&mut state, 1, Difficulty::Hard, 0.0);
        destroy_one(&mut state, 1_000.0);
        destroy_one(&mut state, 2_000.0);
        assert_eq!(state.phase, GamePhase::RoundComplete);
        assert_eq!(state.sounds.round_complete, 1);
        assert!(!state.clock.is_running());
    }

    #[test]
    fn test_continue_keeps_score_and_finishes_game() {
        let mut state = new_state();
        start(&mut state, 1, Difficulty::Hard, 0.0);
        destroy_one(&mut state, 0.0);
        destroy_one(&mut state, 0.0);
        let score = state.progress.score;

        assert!(continue_to_next_round(&mut state, 10.0));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.progress.round, 2);
        assert_eq!(state.progress.difficulty, Difficulty::Beginner);
        assert_eq!(state.progress.score, score);
        assert_eq!(state.progress.words_destroyed, 2);

        start(&mut state, 2, Difficulty::Hard, 20.0);
        destroy_one(&mut state, 20.0);
        destroy_one(&mut state, 20.0);
        assert!(continue_to_next_round(&mut state, 30.0));
        assert_eq!(state.phase, GamePhase::GameComplete);
        assert!(!continue_to_next_round(&mut state, 40.0));
    }

    #[test]
    fn test_select_round_and_start_only_from_selection() {
        let mut state = new_state();
        assert!(select_round_and_start(&mut state, 2, Difficulty::Hard, 0.0));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.progress.round, 2);

        // Mid-session it would wipe the run
        destroy_one(&mut state, 0.0);
        let score = state.progress.score;
        assert!(!select_round_and_start(&mut state, 1, Difficulty::Beginner, 10.0));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.progress.score, score);

        destroy_one(&mut state, 20.0);
        assert!(continue_to_next_round(&mut state, 30.0));
        assert_eq!(state.phase, GamePhase::GameComplete);
        let final_score = state.progress.score;
        assert!(!select_round_and_start(&mut state, 1, Difficulty::Beginner, 40.0));
        assert_eq!(state.phase, GamePhase::GameComplete);
        assert_eq!(state.progress.score, final_score);

        go_to_round_select(&mut state, 50.0);
        assert!(select_round_and_start(&mut state, 1, Difficulty::Beginner, 60.0));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_retry_resets_score() {
        let mut state = new_state();
        start(&mut state, 2, Difficulty::Normal, 0.0);
        destroy_one(&mut state, 0.0);
        game_over(&mut state, 0.0);
        assert!(retry_round(&mut state, 100.0));
        assert_eq!(state.progress.score, 0);
        assert_eq!(state.progress.round, 2);
        assert_eq!(state.progress.difficulty, Difficulty::Beginner);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_restart_from_current_difficulty() {
        let mut state = new_state();
        start(&mut state, 1, Difficulty::Normal, 0.0);
        destroy_one(&mut state, 0.0);
        game_over(&mut state, 0.0);
        assert!(restart_from_current_difficulty(&mut state, 5.0));
        assert_eq!(state.progress.difficulty, Difficulty::Normal);
        assert_eq!(state.progress.score, 0);
    }

    #[test]
    fn test_change_difficulty_from_pause() {
        let mut state = new_state();
        start(&mut state, 1, Difficulty::Beginner, 0.0);
        destroy_one(&mut state, 0.0);
        state.typing.buffer = "क".into();
        assert!(!change_difficulty(&mut state, Difficulty::Hard, 0.0));

        pause(&mut state, 1_000.0);
        assert!(change_difficulty(&mut state, Difficulty::Hard, 3_000.0));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.progress.difficulty, Difficulty::Hard);
        assert_eq!(state.progress.lives, 5);
        assert_eq!(state.progress.difficulty_progress, 0);
        assert_eq!(state.progress.score, 200);
        assert!(state.typing.buffer.is_empty());
        assert_eq!(state.clock.elapsed(3_000.0), 1_000.0);
    }

    #[test]
    fn test_go_to_round_select_clears_field() {
        let mut state = new_state();
        start(&mut state, 1, Difficulty::Beginner, 0.0);
        destroy_one(&mut state, 0.0);
        go_to_round_select(&mut state, 10.0);
        assert_eq!(state.phase, GamePhase::RoundSelect);
        assert!(state.enemies.is_empty());
        assert!(state.projectiles.is_empty());
        assert!(select_round(&mut state, 1));
    }
}
