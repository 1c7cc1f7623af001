//! Session clock that only runs during active play
//!
//! WPM and spawn spacing are measured on this clock, so time spent paused
//! (or on the round-complete screen between continued rounds) never counts.

/// Accumulating stopwatch driven by host timestamps in milliseconds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionClock {
    /// Time banked by earlier running stretches
    accumulated_ms: f64,
    /// Host timestamp at which the current running stretch began
    running_since: Option<f64>,
}

impl SessionClock {
    /// Reset to zero and start running at `now`
    pub fn start(&mut self, now: f64) {
        self.accumulated_ms = 0.0;
        self.running_since = Some(now);
    }

    /// Stop counting, keeping the elapsed total
    pub fn suspend(&mut self, now: f64) {
        if let Some(since) = self.running_since.take() {
            self.accumulated_ms += (now - since).max(0.0);
        }
    }

    /// Continue counting from `now`
    pub fn resume(&mut self, now: f64) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Active milliseconds as of `now`
    pub fn elapsed(&self, now: f64) -> f64 {
        let current = self.running_since.map_or(0.0, |since| (now - since).max(0.0));
        self.accumulated_ms + current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_excludes_suspended_time() {
        let mut clock = SessionClock::default();
        clock.start(1_000.0);
        assert_eq!(clock.elapsed(4_000.0), 3_000.0);

        clock.suspend(4_000.0);
        assert!(!clock.is_running());
        assert_eq!(clock.elapsed(60_000.0), 3_000.0);

        clock.resume(60_000.0);
        assert_eq!(clock.elapsed(62_000.0), 5_000.0);
    }

    #[test]
    fn test_clock_double_calls_are_harmless() {
        let mut clock = SessionClock::default();
        clock.start(0.0);
        clock.resume(500.0); // already running, ignored
        clock.suspend(1_000.0);
        clock.suspend(2_000.0); // already suspended, ignored
        assert_eq!(clock.elapsed(9_000.0), 1_000.0);
    }

    #[test]
    fn test_start_resets() {
        let mut clock = SessionClock::default();
        clock.start(0.0);
        clock.suspend(10_000.0);
        clock.start(20_000.0);
        assert_eq!(clock.elapsed(21_000.0), 1_000.0);
    }
}
