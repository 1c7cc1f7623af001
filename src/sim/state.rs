//! Game state and core simulation types
//!
//! Everything a session mutates lives in [`GameState`]. The tick handler and
//! the key handler both work on this one authoritative store; the renderer
//! only ever sees [`super::Snapshot`] projections of it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::SessionClock;
use crate::text::grapheme_len;
use crate::tuning::{Difficulty, Tuning};
use crate::words::RecentWords;

/// Entity identifier, unique within a session
pub type EntityId = u32;

/// Top-level game flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    /// Choosing a round
    RoundSelect,
    /// Round chosen, choosing the starting difficulty
    DifficultySelect,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// All tiers of the round cleared
    RoundComplete,
    /// Out of lives
    GameOver,
    /// Last round cleared
    GameComplete,
}

impl GamePhase {
    /// Phases during which the frame loop keeps running
    pub fn is_in_session(self) -> bool {
        matches!(self, GamePhase::Playing | GamePhase::Paused)
    }
}

/// A descending target word
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: EntityId,
    pub word: String,
    /// Cached grapheme count of `word`
    pub graphemes: usize,
    /// x fixed at spawn, y grows every unpaused tick until hit
    pub pos: Vec2,
    /// Pixels per nominal frame
    pub speed: f32,
    /// Word completed; frozen until its projectile lands
    pub is_hit: bool,
}

impl Enemy {
    pub fn new(id: EntityId, word: impl Into<String>, pos: Vec2, speed: f32) -> Self {
        let word = word.into();
        Self {
            id,
            graphemes: grapheme_len(&word),
            word,
            pos,
            speed,
            is_hit: false,
        }
    }
}

/// A shot flying from the player to where its enemy was when fired
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: EntityId,
    pub start: Vec2,
    /// Not re-aimed after firing
    pub target: Vec2,
    pub target_enemy: EntityId,
    /// 0 at launch, impact at 1
    pub progress: f32,
}

impl Projectile {
    /// Interpolated position for rendering
    pub fn position(&self) -> Vec2 {
        self.start.lerp(self.target, self.progress.min(1.0))
    }
}

/// Impact effect; removed only when the view reports its animation finished
#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub id: EntityId,
    pub pos: Vec2,
}

/// The player's keystroke buffer and lock-on state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypingState {
    pub buffer: String,
    /// Locked enemy; always live, un-hit and prefix-matching `buffer`
    pub active_target: Option<EntityId>,
    /// Every appended keystroke
    pub total_chars: u32,
    /// Keystrokes that kept or produced a lock
    pub correct_chars: u32,
}

impl TypingState {
    /// Drop the buffer and the lock; counters are kept
    pub fn clear_entry(&mut self) {
        self.buffer.clear();
        self.active_target = None;
    }
}

/// Round, tier and scoring bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// One-based round number
    pub round: u32,
    pub difficulty: Difficulty,
    /// Words completed in the current tier
    pub difficulty_progress: u32,
    /// Words completed over the run
    pub words_destroyed: u32,
    pub score: u64,
    pub lives: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            round: 1,
            difficulty: Difficulty::Beginner,
            difficulty_progress: 0,
            words_destroyed: 0,
            score: 0,
            lives: 0,
        }
    }
}

/// Edge-triggered sound cues; the view plays a sound when a counter grows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundCounters {
    pub word_complete: u32,
    pub life_lost: u32,
    pub round_complete: u32,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub progress: Progress,
    pub typing: TypingState,
    /// Live enemies in spawn order
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    pub sounds: SoundCounters,
    /// Active-play time, paused stretches excluded
    pub clock: SessionClock,
    /// Host timestamp of the previous tick (delta anchor)
    pub last_frame_at: Option<f64>,
    /// Session-clock time before which no enemy may spawn
    pub next_spawn_at: f64,
    pub recent_words: RecentWords,
    /// Tier promotion banner is showing
    pub difficulty_up_notice: bool,
    /// Total rounds offered by the word source
    pub total_rounds: u32,
    /// Per-round tier quota overrides, indexed by round - 1
    pub round_quotas: Vec<Option<u32>>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a session sitting at round select
    pub fn new(tuning: Tuning, total_rounds: u32, seed: u64) -> Self {
        let recent_words = RecentWords::new(tuning.recent_word_window);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            phase: GamePhase::RoundSelect,
            progress: Progress::default(),
            typing: TypingState::default(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            explosions: Vec::new(),
            sounds: SoundCounters::default(),
            clock: SessionClock::default(),
            last_frame_at: None,
            next_spawn_at: 0.0,
            recent_words,
            difficulty_up_notice: false,
            total_rounds: total_rounds.max(1),
            round_quotas: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Enemies still descending (not yet hit)
    pub fn live_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| !e.is_hit)
    }

    /// Remove an enemy by id; a second removal of the same id is a no-op.
    /// A lock on the removed enemy is dropped together with the buffer.
    pub fn remove_enemy(&mut self, id: EntityId) -> Option<Enemy> {
        let index = self.enemies.iter().position(|e| e.id == id)?;
        if self.typing.active_target == Some(id) {
            self.typing.clear_entry();
        }
        Some(self.enemies.remove(index))
    }

    /// Remove an explosion once its animation has finished
    pub fn remove_explosion(&mut self, id: EntityId) -> bool {
        let before = self.explosions.len();
        self.explosions.retain(|e| e.id != id);
        self.explosions.len() != before
    }

    /// Life cap of the current tier
    pub fn max_lives(&self) -> u32 {
        self.tuning.max_lives(self.progress.difficulty)
    }

    /// Words needed to clear the current tier
    pub fn words_per_difficulty(&self) -> u32 {
        let round = self.progress.round.saturating_sub(1) as usize;
        self.round_quotas
            .get(round)
            .copied()
            .flatten()
            .unwrap_or(self.tuning.words_per_difficulty)
            .max(1)
    }

    /// Clear enemies and the typing entry for a fresh field.
    /// Projectiles in flight still land (their enemy is simply gone).
    pub fn clear_field(&mut self) {
        self.enemies.clear();
        self.typing.clear_entry();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn state() -> GameState {
        GameState::new(Tuning::default(), 4, 42)
    }

    #[test]
    fn test_new_state_waits_at_round_select() {
        let state = state();
        assert_eq!(state.phase, GamePhase::RoundSelect);
        assert!(state.enemies.is_empty());
        assert_eq!(state.progress.round, 1);
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = state();
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_enemy_caches_grapheme_count() {
        let enemy = Enemy::new(1, "किताब", Vec2::ZERO, 1.0);
        assert_eq!(enemy.graphemes, 3);
        assert!(!enemy.is_hit);
    }

    #[test]
    fn test_remove_enemy_twice_is_noop() {
        let mut state = state();
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, "अब", Vec2::ZERO, 1.0));
        let other = state.next_entity_id();
        state.enemies.push(Enemy::new(other, "कब", Vec2::ZERO, 1.0));

        assert!(state.remove_enemy(id).is_some());
        let after_first = state.enemies.clone();
        assert!(state.remove_enemy(id).is_none());
        assert_eq!(state.enemies, after_first);
    }

    #[test]
    fn test_removing_locked_enemy_clears_entry() {
        let mut state = state();
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, "अब", Vec2::ZERO, 1.0));
        state.typing.buffer = "अ".into();
        state.typing.active_target = Some(id);

        state.remove_enemy(id);
        assert!(state.typing.buffer.is_empty());
        assert_eq!(state.typing.active_target, None);
    }

    #[test]
    fn test_round_quota_override() {
        let mut state = state();
        assert_eq!(state.words_per_difficulty(), 20);
        state.round_quotas = vec![None, Some(5)];
        assert_eq!(state.words_per_difficulty(), 20);
        state.progress.round = 2;
        assert_eq!(state.words_per_difficulty(), 5);
    }

    #[test]
    fn test_projectile_interpolates() {
        let p = Projectile {
            id: 1,
            start: Vec2::new(0.0, 100.0),
            target: Vec2::new(100.0, 0.0),
            target_enemy: 2,
            progress: 0.5,
        };
        assert_eq!(p.position(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_remove_explosion() {
        let mut state = state();
        let id = state.next_entity_id();
        state.explosions.push(Explosion { id, pos: Vec2::ZERO });
        assert!(state.remove_explosion(id));
        assert!(!state.remove_explosion(id));
    }

    proptest! {
        #[test]
        fn prop_second_removal_changes_nothing(count in 1usize..8, pick in 0usize..8) {
            let mut state = state();
            for i in 0..count {
                let id = state.next_entity_id();
                state.enemies.push(Enemy::new(id, "अब", Vec2::new(i as f32, 0.0), 1.0));
            }
            let id = state.enemies[pick % count].id;
            prop_assert!(state.remove_enemy(id).is_some());
            let after_first = state.enemies.clone();
            prop_assert!(state.remove_enemy(id).is_none());
            prop_assert_eq!(&state.enemies, &after_first);
            prop_assert_eq!(state.enemies.len(), count - 1);
        }
    }
}
