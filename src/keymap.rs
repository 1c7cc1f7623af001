//! Keyboard event classification
//!
//! The renderer forwards raw key events; this module decides which of them
//! mean anything. Script-specific fix-ups (keys the host layout fails to
//! translate) live in a [`KeyRemap`] table so the matching core never sees
//! physical key codes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::text::{grapheme_len, is_devanagari};

/// Keys that never produce input on their own
const IGNORED_KEYS: [&str; 6] = ["Shift", "Control", "Alt", "Meta", "CapsLock", "Tab"];

/// A raw key press as reported by the host (DOM `KeyboardEvent` shape)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyInput {
    /// Produced key value ("a", "क", "Backspace", "Dead", ...)
    pub key: String,
    /// Physical key code ("KeyA", "Digit5", ...)
    pub code: String,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyInput {
    /// A plain key press with no modifiers
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// A key press with its physical code and Shift state
    pub fn with_code(key: impl Into<String>, code: impl Into<String>, shift: bool) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
            shift,
            ..Default::default()
        }
    }
}

/// What a key press means to the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Not meaningful; no state changes
    Ignore,
    /// Escape: pause or resume
    TogglePause,
    /// Remove one trailing typed unit
    Backspace,
    /// Enter: drop the buffer and the locked target
    Clear,
    /// One user-perceived character worth of input
    Text(String),
}

/// Lookup from (physical key, Shift) to the text it should produce when the
/// host layout emits a plain ASCII character instead
#[derive(Debug, Clone, Default)]
pub struct KeyRemap {
    table: HashMap<(String, bool), String>,
}

impl KeyRemap {
    /// No remapping
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shift+digit conjuncts of the Hindi (Mangal/InScript) layout
    pub fn hindi_shift_digits() -> Self {
        let mut remap = Self::empty();
        remap.insert("Digit3", true, "्र");
        remap.insert("Digit4", true, "र्");
        remap.insert("Digit5", true, "ज्ञ");
        remap.insert("Digit6", true, "त्र");
        remap.insert("Digit7", true, "क्ष");
        remap.insert("Digit8", true, "श्र");
        remap
    }

    pub fn insert(&mut self, code: impl Into<String>, shift: bool, text: impl Into<String>) {
        self.table.insert((code.into(), shift), text.into());
    }

    /// Remapped text, applied only when the host produced an ASCII digit
    pub fn lookup(&self, input: &KeyInput) -> Option<&str> {
        let mut chars = input.key.chars();
        let produced_digit =
            matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_digit());
        if !produced_digit {
            return None;
        }
        self.table
            .get(&(input.code.clone(), input.shift))
            .map(String::as_str)
    }

    /// Decide what a key press means
    pub fn classify(&self, input: &KeyInput) -> KeyAction {
        let key = input.key.as_str();
        match key {
            "Escape" => return KeyAction::TogglePause,
            "Backspace" => return KeyAction::Backspace,
            "Enter" => return KeyAction::Clear,
            // Composition in progress; the composed character follows
            "Dead" => return KeyAction::Ignore,
            _ if IGNORED_KEYS.contains(&key) => return KeyAction::Ignore,
            _ => {}
        }

        // Shortcuts, but keep AltGr (reported as Ctrl+Alt) producing text
        if (input.ctrl || input.meta) && !input.alt {
            return KeyAction::Ignore;
        }

        if let Some(text) = self.lookup(input) {
            return KeyAction::Text(text.to_owned());
        }

        if is_printable(key) {
            KeyAction::Text(key.to_owned())
        } else {
            KeyAction::Ignore
        }
    }
}

/// One cluster of visible text, or any Devanagari sequence an IME delivered at once
fn is_printable(key: &str) -> bool {
    if key.is_empty() || key.chars().any(char::is_control) {
        return false;
    }
    grapheme_len(key) == 1 || key.chars().all(is_devanagari)
}
