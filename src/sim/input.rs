//! Input resolution: keystrokes -> buffer -> locked target -> completion
//!
//! Matching always reads the live entity store, never a published snapshot,
//! so a key pressed between ticks sees current positions.

use super::damage;
use super::progression;
use super::state::{Enemy, EntityId, GamePhase, GameState};
use crate::keymap::{KeyAction, KeyInput, KeyRemap};
use crate::text::{is_complete_match, is_typed_prefix, remove_last_cluster};

/// What a key press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// No state change
    Ignored,
    /// Paused or resumed
    PauseToggled,
    /// One trailing unit removed
    Erased,
    /// Buffer and lock dropped
    Cleared,
    /// Character accepted and an enemy is locked
    Matched(EntityId),
    /// Character appended but no enemy matches the buffer
    Mismatched,
    /// Word finished; a projectile is on its way
    Completed { enemy: EntityId, projectile: EntityId },
}

/// Classify and apply a raw key press
pub fn handle_key(state: &mut GameState, remap: &KeyRemap, key: &KeyInput, now: f64) -> KeyOutcome {
    apply_action(state, remap.classify(key), now)
}

/// Apply an already classified key action
pub fn apply_action(state: &mut GameState, action: KeyAction, now: f64) -> KeyOutcome {
    if action == KeyAction::TogglePause {
        return if progression::toggle_pause(state, now) {
            KeyOutcome::PauseToggled
        } else {
            KeyOutcome::Ignored
        };
    }

    // Typing only counts during active play
    if state.phase != GamePhase::Playing {
        return KeyOutcome::Ignored;
    }

    match action {
        KeyAction::Ignore | KeyAction::TogglePause => KeyOutcome::Ignored,
        KeyAction::Backspace => backspace(state),
        KeyAction::Clear => {
            state.typing.clear_entry();
            KeyOutcome::Cleared
        }
        KeyAction::Text(text) => type_text(state, &text, now),
    }
}

fn backspace(state: &mut GameState) -> KeyOutcome {
    if state.typing.buffer.is_empty() {
        return KeyOutcome::Ignored;
    }
    state.typing.buffer = remove_last_cluster(&state.typing.buffer);
    // Re-validate right away; counters are untouched
    state.typing.active_target = resolve_target(state);
    KeyOutcome::Erased
}

fn type_text(state: &mut GameState, text: &str, now: f64) -> KeyOutcome {
    state.typing.buffer.push_str(text);
    state.typing.total_chars += 1;

    let Some(target) = resolve_target(state) else {
        // Buffer stays visible so the view can flag the mismatch
        state.typing.active_target = None;
        return KeyOutcome::Mismatched;
    };
    state.typing.active_target = Some(target);
    state.typing.correct_chars += 1;

    let finished = state
        .enemy(target)
        .is_some_and(|e| is_complete_match(&state.typing.buffer, &e.word));
    if !finished {
        return KeyOutcome::Matched(target);
    }

    state.typing.clear_entry();
    match damage::complete_word(state, target, now) {
        Some(projectile) => KeyOutcome::Completed {
            enemy: target,
            projectile,
        },
        None => KeyOutcome::Mismatched,
    }
}

/// The enemy the current buffer should lock onto.
///
/// The current lock wins while it still matches, so targets don't jump
/// mid-word. Otherwise the matching enemy closest to the floor is chosen;
/// among equal heights the earliest spawned wins.
pub fn resolve_target(state: &GameState) -> Option<EntityId> {
    let buffer = state.typing.buffer.as_str();
    if buffer.is_empty() {
        return None;
    }

    let locked = state
        .typing
        .active_target
        .and_then(|id| state.enemy(id))
        .filter(|e| !e.is_hit && is_typed_prefix(buffer, &e.word));
    if let Some(enemy) = locked {
        return Some(enemy.id);
    }

    state
        .live_enemies()
        .filter(|e| is_typed_prefix(buffer, &e.word))
        .fold(None, |best: Option<&Enemy>, e| match best {
            Some(b) if b.pos.y >= e.pos.y => Some(b),
            _ => Some(e),
        })
        .map(|e| e.id)
}
