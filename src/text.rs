//! Grapheme-aware text helpers for typed Devanagari input
//!
//! One "letter" the player types can be several code points (a consonant
//! plus a vowel sign, nukta or nasalization mark). Everything that counts,
//! compares or deletes typed text goes through extended grapheme clusters.

use unicode_segmentation::UnicodeSegmentation;

/// Split a word into user-perceived characters (extended grapheme clusters)
pub fn segment(word: &str) -> Vec<String> {
    word.graphemes(true).map(str::to_owned).collect()
}

/// Number of user-perceived characters in `text`
pub fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// True for marks that attach to a preceding base letter and are typed with
/// their own keystroke: vowel signs, virama, nukta, candrabindu/anusvara/visarga
/// and the zero-width joiners.
pub fn is_modifier_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0900}'..='\u{0903}'
            | '\u{093A}'..='\u{093C}'
            | '\u{093E}'..='\u{094F}'
            | '\u{0951}'..='\u{0957}'
            | '\u{0962}'..='\u{0963}'
            | '\u{200C}'
            | '\u{200D}'
    )
}

/// True if `c` is in the Devanagari block
pub fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Remove one trailing typed unit.
///
/// A trailing modifier mark is stripped on its own so the base letter stays
/// typed ("की" -> "क"); otherwise the whole last cluster goes ("कब" -> "क").
pub fn remove_last_cluster(text: &str) -> String {
    let Some(last) = text.chars().next_back() else {
        return String::new();
    };

    if is_modifier_mark(last) {
        return text[..text.len() - last.len_utf8()].to_owned();
    }

    match text.grapheme_indices(true).next_back() {
        Some((start, _)) => text[..start].to_owned(),
        None => String::new(),
    }
}

/// Whether `typed` is a valid partial entry of `word`.
///
/// Every completed cluster must match exactly. The last typed cluster may be
/// a leading part of the word's cluster at that position, so a bare consonant
/// is accepted on the way to consonant + vowel sign.
pub fn is_typed_prefix(typed: &str, word: &str) -> bool {
    let typed: Vec<&str> = typed.graphemes(true).collect();
    let word: Vec<&str> = word.graphemes(true).collect();

    if typed.len() > word.len() {
        return false;
    }

    let Some((last, complete)) = typed.split_last() else {
        // Empty input is a prefix of everything
        return true;
    };

    complete.iter().zip(&word).all(|(t, w)| t == w) && word[complete.len()].starts_with(last)
}

/// Whether `typed` spells `word` completely (same clusters, same count)
pub fn is_complete_match(typed: &str, word: &str) -> bool {
    grapheme_len(typed) == grapheme_len(word) && typed.graphemes(true).eq(word.graphemes(true))
}
