//! Akshar Strike - a Devanagari typing arcade game
//!
//! Core modules:
//! - `sim`: Simulation core (entities, input resolution, tick, progression)
//! - `game`: Session driver tying the core to a frame scheduler
//! - `platform`: Frame/timer scheduling abstraction and browser bindings
//! - `text`: Grapheme-aware helpers for typed text
//! - `words`: Word source with short-term repetition avoidance
//! - `keymap`: Key classification and script remapping
//! - `metrics`: Typing speed and accuracy
//! - `tuning`: Data-driven game balance

pub mod game;
pub mod keymap;
pub mod metrics;
pub mod platform;
pub mod sim;
pub mod text;
pub mod tuning;
pub mod words;

pub use game::Game;
pub use keymap::{KeyAction, KeyInput, KeyRemap};
pub use tuning::{Difficulty, Tuning};
pub use words::{WordPool, WordSource};

/// Game configuration constants
pub mod consts {
    /// Nominal display frame length (60 Hz); enemy speeds are per nominal frame
    pub const FRAME_MS: f64 = 16.67;
    /// A single tick never advances more than this many nominal frames
    pub const MAX_FRAME_DELTA: f32 = 3.0;
    /// Snapshots reach the renderer at most every 50 ms (~20/s)
    pub const PUBLISH_INTERVAL_MS: f64 = 50.0;
    /// Projectile progress per tick (impact after 7 ticks)
    pub const PROJECTILE_STEP: f32 = 0.15;
    /// Words to clear per difficulty tier
    pub const WORDS_PER_DIFFICULTY: u32 = 20;
    /// Points per grapheme before round/difficulty multipliers
    pub const POINTS_PER_GRAPHEME: u64 = 100;
}
