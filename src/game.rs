//! Session driver
//!
//! Owns the authoritative [`GameState`] and wires it to a host
//! [`Scheduler`]. Key presses and frame callbacks both mutate the same
//! state directly; the renderer is fed throttled [`Snapshot`]s.
//!
//! The frame loop and spawn timer run exactly while a session is in
//! progress (playing or paused). Every entry point ends in `sync_loop`,
//! which schedules what is missing and cancels what should stop, so a
//! callback is never registered twice.

use crate::keymap::{KeyInput, KeyRemap};
use crate::platform::{Handle, Scheduler};
use crate::sim::{
    self, EntityId, GamePhase, GameState, KeyOutcome, Snapshot, SnapshotThrottle, progression,
};
use crate::tuning::{Difficulty, Tuning};
use crate::words::{WordPool, WordSource, WordSourceError};

/// Receives published snapshots
pub type SnapshotSink = Box<dyn FnMut(&Snapshot)>;

pub struct Game<S: Scheduler> {
    state: GameState,
    words: Box<dyn WordSource>,
    remap: KeyRemap,
    scheduler: S,
    frame: Option<Handle>,
    spawn_timer: Option<Handle>,
    throttle: SnapshotThrottle,
    sink: Option<SnapshotSink>,
}

impl<S: Scheduler> Game<S> {
    pub fn new(tuning: Tuning, words: Box<dyn WordSource>, scheduler: S, seed: u64) -> Self {
        let total_rounds = words.total_rounds();
        let mut state = GameState::new(tuning, total_rounds, seed);
        state.round_quotas = (1..=total_rounds)
            .map(|round| words.round_config(round).and_then(|c| c.words_per_difficulty))
            .collect();
        let throttle = SnapshotThrottle::new(state.tuning.publish_interval_ms);
        log::info!("Game created with seed {} ({} rounds)", seed, total_rounds);

        Self {
            state,
            words,
            remap: KeyRemap::hindi_shift_digits(),
            scheduler,
            frame: None,
            spawn_timer: None,
            throttle,
            sink: None,
        }
    }

    /// Game with the built-in word pool and default tuning
    pub fn with_builtin_words(scheduler: S, seed: u64) -> Result<Self, WordSourceError> {
        let words = WordPool::builtin()?;
        Ok(Self::new(Tuning::default(), Box::new(words), scheduler, seed))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn set_remap(&mut self, remap: KeyRemap) {
        self.remap = remap;
    }

    /// Register the renderer's snapshot callback
    pub fn subscribe(&mut self, sink: SnapshotSink) {
        self.sink = Some(sink);
    }

    /// Current snapshot, outside the publication schedule
    pub fn snapshot(&self, now: f64) -> Snapshot {
        Snapshot::capture(&self.state, self.words.as_ref(), now)
    }

    /// True while the frame loop is scheduled
    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    // ---- Host callbacks ----

    /// Display frame callback
    pub fn on_frame(&mut self, now: f64) {
        // The request that brought us here has fired
        self.frame = None;
        if !self.state.phase.is_in_session() {
            return;
        }

        let phase = self.state.phase;
        sim::tick(&mut self.state, now);
        let changed = phase != self.state.phase;
        self.sync_loop();
        self.publish(now, changed);
    }

    /// Spawn timer callback
    pub fn on_spawn_timer(&mut self, now: f64) {
        if self.spawn_timer.is_none() {
            return;
        }
        // Skips are routine (cadence finer than spawn spacing)
        let _ = sim::try_spawn(&mut self.state, self.words.as_ref(), now);
    }

    /// Raw key press from the host
    pub fn on_key(&mut self, key: &KeyInput, now: f64) -> KeyOutcome {
        let outcome = sim::handle_key(&mut self.state, &self.remap, key, now);
        if outcome != KeyOutcome::Ignored {
            self.after_change(now);
        }
        outcome
    }

    // ---- Commands from the view ----

    pub fn select_round(&mut self, round: u32, now: f64) -> bool {
        let ok = progression::select_round(&mut self.state, round);
        self.after_change(now);
        ok
    }

    /// Fresh run of `round` starting at `difficulty`; only from the
    /// selection screens
    pub fn select_round_and_start(&mut self, round: u32, difficulty: Difficulty, now: f64) -> bool {
        let ok = progression::select_round_and_start(&mut self.state, round, difficulty, now);
        self.after_change(now);
        ok
    }

    /// Start the round picked with `select_round`
    pub fn start_selected(&mut self, difficulty: Difficulty, now: f64) -> bool {
        let ok = progression::start_selected(&mut self.state, difficulty, now);
        self.after_change(now);
        ok
    }

    pub fn pause(&mut self, now: f64) -> bool {
        let ok = progression::pause(&mut self.state, now);
        self.after_change(now);
        ok
    }

    pub fn resume(&mut self, now: f64) -> bool {
        let ok = progression::resume(&mut self.state, now);
        self.after_change(now);
        ok
    }

    pub fn toggle_pause(&mut self, now: f64) -> bool {
        let ok = progression::toggle_pause(&mut self.state, now);
        self.after_change(now);
        ok
    }

    pub fn change_difficulty(&mut self, difficulty: Difficulty, now: f64) -> bool {
        let ok = progression::change_difficulty(&mut self.state, difficulty, now);
        self.after_change(now);
        ok
    }

    pub fn continue_to_next_round(&mut self, now: f64) -> bool {
        let ok = progression::continue_to_next_round(&mut self.state, now);
        self.after_change(now);
        ok
    }

    pub fn retry_round(&mut self, now: f64) -> bool {
        let ok = progression::retry_round(&mut self.state, now);
        self.after_change(now);
        ok
    }

    pub fn restart_from_current_difficulty(&mut self, now: f64) -> bool {
        let ok = progression::restart_from_current_difficulty(&mut self.state, now);
        self.after_change(now);
        ok
    }

    pub fn go_to_round_select(&mut self, now: f64) {
        progression::go_to_round_select(&mut self.state, now);
        self.after_change(now);
    }

    /// The view finished an explosion animation
    pub fn remove_explosion(&mut self, id: EntityId, now: f64) -> bool {
        let removed = self.state.remove_explosion(id);
        if removed {
            self.publish(now, true);
        }
        removed
    }

    /// The view finished showing the promotion banner
    pub fn hide_difficulty_up(&mut self, now: f64) {
        progression::hide_difficulty_up(&mut self.state);
        self.publish(now, true);
    }

    // ---- Loop bookkeeping ----

    fn after_change(&mut self, now: f64) {
        self.sync_loop();
        self.publish(now, true);
    }

    /// Schedule or cancel the frame loop and spawn timer to match the phase
    fn sync_loop(&mut self) {
        if self.state.phase.is_in_session() {
            if self.frame.is_none() {
                self.frame = Some(self.scheduler.request_frame());
            }
            if self.spawn_timer.is_none() {
                let interval = self.state.tuning.spawn_check_interval_ms;
                self.spawn_timer = Some(self.scheduler.start_spawn_timer(interval));
                log::debug!("Spawn timer started ({} ms)", interval);
            }
        } else {
            if let Some(handle) = self.frame.take() {
                self.scheduler.cancel_frame(handle);
            }
            if let Some(handle) = self.spawn_timer.take() {
                self.scheduler.cancel_spawn_timer(handle);
                log::debug!("Spawn timer stopped");
            }
        }
    }

    /// Push a snapshot to the sink; unforced publishes are rate limited
    fn publish(&mut self, now: f64, force: bool) {
        if self.sink.is_none() {
            return;
        }
        if force {
            self.throttle.mark(now);
        } else if !self.throttle.should_publish(now) {
            return;
        }
        let snapshot = Snapshot::capture(&self.state, self.words.as_ref(), now);
        if let Some(sink) = self.sink.as_mut() {
            sink(&snapshot);
        }
    }
}

impl<S: Scheduler> Drop for Game<S> {
    fn drop(&mut self) {
        // Nothing may call into a dropped game
        if let Some(handle) = self.frame.take() {
            self.scheduler.cancel_frame(handle);
        }
        if let Some(handle) = self.spawn_timer.take() {
            self.scheduler.cancel_spawn_timer(handle);
        }
    }
}
