//! Read-only view of a session for the renderer
//!
//! Snapshots are plain data, serialised as camelCase JSON for the browser.
//! Input resolution never reads them; they exist only for drawing.

use serde::Serialize;

use super::state::{EntityId, GamePhase, GameState, SoundCounters};
use crate::metrics;
use crate::text::grapheme_len;
use crate::tuning::Difficulty;
use crate::words::WordSource;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyView {
    pub id: EntityId,
    pub word: String,
    pub x: f32,
    pub y: f32,
    pub is_hit: bool,
    pub is_active: bool,
    /// Graphemes already typed toward this word (active enemy only)
    pub typed_graphemes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileView {
    pub id: EntityId,
    pub start: [f32; 2],
    pub target: [f32; 2],
    pub progress: f32,
    /// Interpolated for convenience
    pub position: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplosionView {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
}

/// Everything the view needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: GamePhase,
    pub round: u32,
    pub total_rounds: u32,
    pub round_label: String,
    pub round_label_native: String,
    pub difficulty: Difficulty,
    pub difficulty_label: String,
    pub difficulty_label_native: String,
    pub difficulty_progress: u32,
    pub words_per_difficulty: u32,
    pub score: u64,
    pub lives: u32,
    pub max_lives: u32,
    pub words_destroyed: u32,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub explosions: Vec<ExplosionView>,
    pub current_input: String,
    pub active_target_id: Option<EntityId>,
    /// Buffer is non-empty but matches nothing
    pub input_mismatch: bool,
    pub wpm: u32,
    pub accuracy: u32,
    pub sounds: SoundCounters,
    pub difficulty_up_notice: bool,
}

impl Snapshot {
    /// Project `state` as of host time `now`
    pub fn capture(state: &GameState, words: &dyn WordSource, now: f64) -> Self {
        let progress = &state.progress;
        let typing = &state.typing;
        let round_config = words.round_config(progress.round);
        let settings = state.tuning.difficulty(progress.difficulty);
        let typed_graphemes = grapheme_len(&typing.buffer);

        let enemies = state
            .enemies
            .iter()
            .map(|e| {
                let is_active = typing.active_target == Some(e.id);
                EnemyView {
                    id: e.id,
                    word: e.word.clone(),
                    x: e.pos.x,
                    y: e.pos.y,
                    is_hit: e.is_hit,
                    is_active,
                    typed_graphemes: if is_active { typed_graphemes } else { 0 },
                }
            })
            .collect();

        let projectiles = state
            .projectiles
            .iter()
            .map(|p| ProjectileView {
                id: p.id,
                start: p.start.to_array(),
                target: p.target.to_array(),
                progress: p.progress,
                position: p.position().to_array(),
            })
            .collect();

        let explosions = state
            .explosions
            .iter()
            .map(|e| ExplosionView {
                id: e.id,
                x: e.pos.x,
                y: e.pos.y,
            })
            .collect();

        Self {
            phase: state.phase,
            round: progress.round,
            total_rounds: state.total_rounds,
            round_label: round_config.as_ref().map(|c| c.label.clone()).unwrap_or_default(),
            round_label_native: round_config.map(|c| c.label_native).unwrap_or_default(),
            difficulty: progress.difficulty,
            difficulty_label: settings.label.clone(),
            difficulty_label_native: settings.label_native.clone(),
            difficulty_progress: progress.difficulty_progress,
            words_per_difficulty: state.words_per_difficulty(),
            score: progress.score,
            lives: progress.lives,
            max_lives: state.max_lives(),
            words_destroyed: progress.words_destroyed,
            enemies,
            projectiles,
            explosions,
            current_input: typing.buffer.clone(),
            active_target_id: typing.active_target,
            input_mismatch: !typing.buffer.is_empty() && typing.active_target.is_none(),
            wpm: metrics::words_per_minute(progress.words_destroyed, state.clock.elapsed(now)),
            accuracy: metrics::accuracy(typing.correct_chars, typing.total_chars),
            sounds: state.sounds,
            difficulty_up_notice: state.difficulty_up_notice,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Rate limit for snapshot publication
#[derive(Debug, Clone)]
pub struct SnapshotThrottle {
    interval_ms: f64,
    last_published: Option<f64>,
}

impl SnapshotThrottle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_published: None,
        }
    }

    /// True (and records `now`) if at least one interval has passed
    pub fn should_publish(&mut self, now: f64) -> bool {
        match self.last_published {
            Some(last) if now - last < self.interval_ms => false,
            _ => {
                self.last_published = Some(now);
                true
            }
        }
    }

    /// Record an out-of-band publish (key press, phase change)
    pub fn mark(&mut self, now: f64) {
        self.last_published = Some(now);
    }
}
