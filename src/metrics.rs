//! Typing speed and accuracy

/// Words per minute, rounded. Zero elapsed time reads as 0 WPM.
pub fn words_per_minute(words_completed: u32, elapsed_ms: f64) -> u32 {
    if elapsed_ms <= 0.0 {
        return 0;
    }
    let minutes = elapsed_ms / 60_000.0;
    (words_completed as f64 / minutes).round() as u32
}

/// Percentage of typed characters that matched a target, rounded.
/// Nothing typed yet reads as 100%.
pub fn accuracy(correct_chars: u32, total_chars: u32) -> u32 {
    if total_chars == 0 {
        return 100;
    }
    (correct_chars as f64 / total_chars as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wpm_zero_elapsed() {
        assert_eq!(words_per_minute(10, 0.0), 0);
    }

    #[test]
    fn test_wpm_rounding() {
        assert_eq!(words_per_minute(30, 60_000.0), 30);
        assert_eq!(words_per_minute(1, 40_000.0), 2); // 1.5 rounds up
        assert_eq!(words_per_minute(5, 120_000.0), 3); // 2.5 rounds up
        assert_eq!(words_per_minute(0, 10_000.0), 0);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(0, 0), 100);
        assert_eq!(accuracy(3, 4), 75);
        assert_eq!(accuracy(2, 3), 67);
        assert_eq!(accuracy(0, 5), 0);
        assert_eq!(accuracy(9, 9), 100);
    }
}
