//! Data-driven game balance
//!
//! Every number that shapes a session lives here so a JSON override can
//! retune the game without touching the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Difficulty tiers within a round, easiest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Normal,
    Hard,
}

impl Difficulty {
    /// Promotion order within a round
    pub const ORDER: [Difficulty; 3] = [Difficulty::Beginner, Difficulty::Normal, Difficulty::Hard];

    /// Zero-based position in [`Difficulty::ORDER`]
    pub fn index(self) -> usize {
        match self {
            Difficulty::Beginner => 0,
            Difficulty::Normal => 1,
            Difficulty::Hard => 2,
        }
    }

    /// One-based rank, used as the score multiplier
    pub fn rank(self) -> u32 {
        self.index() as u32 + 1
    }

    /// The tier after this one, or None at the hardest tier
    pub fn next(self) -> Option<Difficulty> {
        Self::ORDER.get(self.index() + 1).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "beginner" | "easy" => Some(Difficulty::Beginner),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Per-tier multipliers and life cap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    pub speed_multiplier: f32,
    pub spawn_multiplier: f64,
    pub max_enemies_multiplier: f32,
    pub lives: u32,
    pub label: String,
    pub label_native: String,
}

impl DifficultySettings {
    fn new(speed: f32, spawn: f64, max_enemies: f32, lives: u32, label: &str, native: &str) -> Self {
        Self {
            speed_multiplier: speed,
            spawn_multiplier: spawn,
            max_enemies_multiplier: max_enemies,
            lives,
            label: label.to_owned(),
            label_native: native.to_owned(),
        }
    }
}

/// Playfield size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub viewport: Viewport,
    /// Horizontal band kept clear at each screen edge when spawning
    pub spawn_margin: f32,
    /// Distance of the floor threshold above the bottom edge
    pub floor_offset: f32,
    /// Vertical spawn position (just above the top edge)
    pub spawn_y: f32,
    /// Distance of the player ship above the bottom edge
    pub player_offset: f32,
    /// Words to clear before promotion to the next tier
    pub words_per_difficulty: u32,
    /// Projectile progress added per tick
    pub projectile_step: f32,
    /// Length of one nominal frame; enemy speeds are pixels per nominal frame
    pub frame_ms: f64,
    /// Largest delta a single tick may apply, in nominal frames
    pub max_frame_delta: f32,
    /// Minimum gap between published snapshots
    pub publish_interval_ms: f64,
    /// Delay before the first spawn after play starts
    pub first_spawn_delay_ms: f64,
    /// Cadence of the spawn timer
    pub spawn_check_interval_ms: f64,
    /// Lower bound on the spacing between spawns
    pub min_spawn_interval_ms: f64,
    /// Recently used words the word source avoids
    pub recent_word_window: usize,
    pub beginner: DifficultySettings,
    pub normal: DifficultySettings,
    pub hard: DifficultySettings,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            spawn_margin: 100.0,
            floor_offset: 100.0,
            spawn_y: -50.0,
            player_offset: 60.0,
            words_per_difficulty: WORDS_PER_DIFFICULTY,
            projectile_step: PROJECTILE_STEP,
            frame_ms: FRAME_MS,
            max_frame_delta: MAX_FRAME_DELTA,
            publish_interval_ms: PUBLISH_INTERVAL_MS,
            first_spawn_delay_ms: 1000.0,
            spawn_check_interval_ms: 250.0,
            min_spawn_interval_ms: 600.0,
            recent_word_window: 10,
            beginner: DifficultySettings::new(0.5, 1.8, 0.6, 7, "Easy", "आसान"),
            normal: DifficultySettings::new(1.0, 1.0, 1.0, 5, "Medium", "मध्यम"),
            hard: DifficultySettings::new(1.5, 0.6, 1.4, 5, "Hard", "कठिन"),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning override; missing fields keep
    /// defaults at every depth, so `{"hard":{"lives":3}}` leaves the other
    /// hard settings alone
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let patch: serde_json::Value = serde_json::from_str(json)?;
        let mut merged = serde_json::to_value(Self::default())?;
        merge_json(&mut merged, patch);
        serde_json::from_value(merged)
    }

    /// Tuning with a different playfield size
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    pub fn difficulty(&self, difficulty: Difficulty) -> &DifficultySettings {
        match difficulty {
            Difficulty::Beginner => &self.beginner,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }

    /// Life cap for a tier
    pub fn max_lives(&self, difficulty: Difficulty) -> u32 {
        self.difficulty(difficulty).lives
    }

    /// Vertical position at which an un-hit enemy costs a life
    pub fn floor_y(&self) -> f32 {
        self.viewport.height - self.floor_offset
    }

    /// Where projectiles are fired from
    pub fn player_pos(&self) -> Vec2 {
        Vec2::new(self.viewport.width / 2.0, self.viewport.height - self.player_offset)
    }

    /// Horizontal spawn band as (min, max)
    pub fn spawn_band(&self) -> (f32, f32) {
        let min = self.spawn_margin;
        let max = (self.viewport.width - self.spawn_margin).max(min);
        (min, max)
    }

    /// Descent speed in pixels per nominal frame
    pub fn enemy_speed(&self, round: u32, difficulty: Difficulty) -> f32 {
        base_speed_for_round(round) * self.difficulty(difficulty).speed_multiplier
    }

    /// Minimum spacing between spawns in milliseconds
    pub fn spawn_interval_ms(&self, round: u32, difficulty: Difficulty) -> f64 {
        let scaled = base_spawn_interval_for_round(round) * self.difficulty(difficulty).spawn_multiplier;
        scaled.floor().max(self.min_spawn_interval_ms)
    }

    /// Cap on concurrently alive, non-hit enemies
    pub fn max_enemies(&self, round: u32, difficulty: Difficulty) -> usize {
        let scaled = base_cap_for_round(round) as f32 * self.difficulty(difficulty).max_enemies_multiplier;
        (scaled.floor() as usize).max(1)
    }
}

/// Base descent speed: slow for rounds 1-3, medium for 4-6, fast after
pub fn base_speed_for_round(round: u32) -> f32 {
    let r = round as f32;
    if round <= 3 {
        0.5 + r * 0.1
    } else if round <= 6 {
        0.8 + (r - 3.0) * 0.15
    } else {
        1.25 + (r - 6.0) * 0.1
    }
}

/// Base spawn spacing, shrinking 150 ms per round down to 1200 ms
pub fn base_spawn_interval_for_round(round: u32) -> f64 {
    (2500.0 - round as f64 * 150.0).max(1200.0)
}

/// Base number of enemies on screen at once
pub fn base_cap_for_round(round: u32) -> u32 {
    match round {
        0..=2 => 4,
        3..=4 => 5,
        5..=6 => 6,
        _ => 7,
    }
}

fn merge_json(base: &mut serde_json::Value, patch: serde_json::Value) {
    use serde_json::Value;
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_order() {
        assert_eq!(Difficulty::Beginner.next(), Some(Difficulty::Normal));
        assert_eq!(Difficulty::Normal.next(), Some(Difficulty::Hard));
        assert_eq!(Difficulty::Hard.next(), None);
        assert_eq!(Difficulty::Hard.rank(), 3);
        assert_eq!(Difficulty::from_str("Easy"), Some(Difficulty::Beginner));
        assert_eq!(Difficulty::from_str("nightmare"), None);
    }

    #[test]
    fn test_round_curves() {
        assert!((base_speed_for_round(1) - 0.6).abs() < 1e-6);
        assert!((base_speed_for_round(4) - 0.95).abs() < 1e-6);
        assert!((base_speed_for_round(7) - 1.35).abs() < 1e-6);
        assert_eq!(base_spawn_interval_for_round(1), 2350.0);
        assert_eq!(base_spawn_interval_for_round(20), 1200.0);
        assert_eq!(base_cap_for_round(1), 4);
        assert_eq!(base_cap_for_round(4), 5);
        assert_eq!(base_cap_for_round(9), 7);
    }

    #[test]
    fn test_difficulty_scaling() {
        let tuning = Tuning::default();
        // floor(4 * 0.6) = 2
        assert_eq!(tuning.max_enemies(1, Difficulty::Beginner), 2);
        // floor(4 * 1.4) = 5
        assert_eq!(tuning.max_enemies(1, Difficulty::Hard), 5);
        assert!((tuning.spawn_interval_ms(1, Difficulty::Beginner) - 4230.0).abs() <= 1.0);
        assert_eq!(tuning.spawn_interval_ms(1, Difficulty::Normal), 2350.0);
        assert!((tuning.enemy_speed(1, Difficulty::Beginner) - 0.3).abs() < 1e-6);
        assert_eq!(tuning.max_lives(Difficulty::Beginner), 7);
        assert_eq!(tuning.max_lives(Difficulty::Hard), 5);
    }

    #[test]
    fn test_spawn_interval_floor() {
        let mut tuning = Tuning::default();
        tuning.min_spawn_interval_ms = 1500.0;
        // 2350 * 0.6 = 1410, clamped up to the floor
        assert_eq!(tuning.spawn_interval_ms(1, Difficulty::Hard), 1500.0);
    }

    #[test]
    fn test_geometry() {
        let tuning = Tuning::default().with_viewport(1000.0, 600.0);
        assert_eq!(tuning.floor_y(), 500.0);
        assert_eq!(tuning.player_pos(), Vec2::new(500.0, 540.0));
        assert_eq!(tuning.spawn_band(), (100.0, 900.0));
    }

    #[test]
    fn test_partial_json_override() {
        let tuning = Tuning::from_json(r#"{ "words_per_difficulty": 5, "viewport": { "width": 640, "height": 480 } }"#)
            .unwrap();
        assert_eq!(tuning.words_per_difficulty, 5);
        assert_eq!(tuning.viewport.width, 640.0);
        assert_eq!(tuning.beginner.lives, 7);
    }

    #[test]
    fn test_partial_tier_override_keeps_tier_defaults() {
        let tuning = Tuning::from_json(r#"{ "hard": { "lives": 3 }, "viewport": { "width": 640 } }"#).unwrap();
        assert_eq!(tuning.hard.lives, 3);
        assert_eq!(tuning.hard.speed_multiplier, 1.5);
        assert_eq!(tuning.hard.spawn_multiplier, 0.6);
        assert_eq!(tuning.hard.label, "Hard");
        assert_eq!(tuning.normal, Tuning::default().normal);
        assert_eq!(tuning.viewport.width, 640.0);
        assert_eq!(tuning.viewport.height, Tuning::default().viewport.height);

        assert!(Tuning::from_json(r#"{ "hard": { "lives": "many" } }"#).is_err());
    }
}
