//! Word source: per-round word lists with short-term repetition avoidance
//!
//! The game only talks to the [`WordSource`] trait. [`WordPool`] is the
//! built-in implementation backed by `data/rounds.json`.

use std::collections::VecDeque;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Embedded default round table
const BUILTIN_ROUNDS: &str = include_str!("../data/rounds.json");

#[derive(Debug, Error)]
pub enum WordSourceError {
    #[error("word pool parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("word pool has no rounds")]
    NoRounds,
    #[error("round {0} has no words")]
    EmptyRound(u32),
    #[error("rounds must be numbered 1..=n in order, found {found} at position {position}")]
    RoundOrder { position: usize, found: u32 },
}

/// Static description of a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub round: u32,
    pub label: String,
    #[serde(default)]
    pub label_native: String,
    /// Per-tier word quota override for this round
    #[serde(default)]
    pub words_per_difficulty: Option<u32>,
}

/// Bounded history of recently issued words
#[derive(Debug, Clone)]
pub struct RecentWords {
    words: VecDeque<String>,
    capacity: usize,
}

impl RecentWords {
    pub fn new(capacity: usize) -> Self {
        Self {
            words: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a word, evicting the oldest once the window is full
    pub fn push(&mut self, word: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.words.len() == self.capacity {
            self.words.pop_front();
        }
        self.words.push_back(word.into());
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Query contract the game needs from its word data
pub trait WordSource {
    /// Pick a word for `round`, avoiding `recent` whenever another word exists
    fn word_for_round(&self, round: u32, recent: &RecentWords, rng: &mut Pcg32) -> Option<String>;

    /// Label and quota for `round`
    fn round_config(&self, round: u32) -> Option<RoundConfig>;

    /// Number of playable rounds
    fn total_rounds(&self) -> u32;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RoundEntry {
    #[serde(flatten)]
    config: RoundConfig,
    words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PoolFile {
    rounds: Vec<RoundEntry>,
}

/// Word lists for every round
#[derive(Debug, Clone)]
pub struct WordPool {
    rounds: Vec<RoundEntry>,
}

impl WordPool {
    /// The word lists shipped with the game
    pub fn builtin() -> Result<Self, WordSourceError> {
        Self::from_json(BUILTIN_ROUNDS)
    }

    /// Parse and validate a round table
    pub fn from_json(json: &str) -> Result<Self, WordSourceError> {
        let file: PoolFile = serde_json::from_str(json)?;
        if file.rounds.is_empty() {
            return Err(WordSourceError::NoRounds);
        }
        for (position, entry) in file.rounds.iter().enumerate() {
            if entry.config.round != position as u32 + 1 {
                return Err(WordSourceError::RoundOrder {
                    position,
                    found: entry.config.round,
                });
            }
            if entry.words.iter().all(|w| w.trim().is_empty()) {
                return Err(WordSourceError::EmptyRound(entry.config.round));
            }
        }

        let rounds = file
            .rounds
            .into_iter()
            .map(|mut entry| {
                entry.words.retain(|w| !w.trim().is_empty());
                entry
            })
            .collect::<Vec<_>>();
        log::info!("Loaded word pool: {} rounds", rounds.len());
        Ok(Self { rounds })
    }

    /// All words for a round (rounds past the end reuse the last list)
    pub fn words(&self, round: u32) -> &[String] {
        self.entry(round).map(|e| e.words.as_slice()).unwrap_or(&[])
    }

    fn entry(&self, round: u32) -> Option<&RoundEntry> {
        let index = (round.max(1) as usize - 1).min(self.rounds.len().saturating_sub(1));
        self.rounds.get(index)
    }
}

impl WordSource for WordPool {
    fn word_for_round(&self, round: u32, recent: &RecentWords, rng: &mut Pcg32) -> Option<String> {
        let words = self.words(round);
        if words.is_empty() {
            return None;
        }

        let fresh: Vec<&String> = words.iter().filter(|w| !recent.contains(w)).collect();
        let word = if fresh.is_empty() {
            &words[rng.random_range(0..words.len())]
        } else {
            fresh[rng.random_range(0..fresh.len())]
        };
        Some(word.clone())
    }

    fn round_config(&self, round: u32) -> Option<RoundConfig> {
        self.rounds
            .get((round as usize).checked_sub(1)?)
            .map(|e| e.config.clone())
    }

    fn total_rounds(&self) -> u32 {
        self.rounds.len() as u32
    }
}
