//! Platform abstraction layer
//!
//! The game needs exactly two kinds of callbacks from its host:
//! - Next display frame (requestAnimationFrame on web)
//! - A repeating spawn timer (setInterval on web)
//!
//! [`Scheduler`] hides which host provides them. The browser implementation
//! lives in [`web`]; [`ManualScheduler`] lets tests and the native demo fire
//! callbacks by hand.

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::RefCell;
use std::rc::Weak;

/// Opaque handle for a scheduled callback
pub type Handle = i32;

/// Host callback scheduling
pub trait Scheduler {
    /// Ask for one callback on the next display frame
    fn request_frame(&mut self) -> Handle;

    /// Drop a frame request that has not fired yet
    fn cancel_frame(&mut self, handle: Handle);

    /// Start a repeating timer firing every `interval_ms`
    fn start_spawn_timer(&mut self, interval_ms: f64) -> Handle;

    /// Stop a running timer
    fn cancel_spawn_timer(&mut self, handle: Handle);
}

/// What happened to a host callback aimed at the shared game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The game was dropped
    Gone,
    /// The game was already borrowed; the callback did not run
    Busy,
}

/// Run `f` against `target` if it is still alive and not already borrowed.
///
/// A `Busy` frame callback must be requested again by the caller, otherwise
/// the game keeps a handle to a frame that will never run.
pub fn deliver<T>(target: &Weak<RefCell<T>>, f: impl FnOnce(&mut T)) -> Delivery {
    let Some(target) = target.upgrade() else {
        return Delivery::Gone;
    };
    match target.try_borrow_mut() {
        Ok(mut t) => {
            f(&mut t);
            Delivery::Delivered
        }
        Err(_) => Delivery::Busy,
    }
}

/// Scheduler that only records requests; the caller fires them
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_handle: Handle,
    pending_frame: Option<Handle>,
    spawn_timer: Option<(Handle, f64)>,
    /// Frame requests made while one was already pending
    pub double_frame_requests: u32,
    /// Timers started while one was already running
    pub double_timer_starts: u32,
    pub frames_requested: u32,
    pub frames_cancelled: u32,
    pub timers_started: u32,
    pub timers_cancelled: u32,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> Handle {
        self.next_handle += 1;
        self.next_handle
    }

    /// Consume the pending frame request, if any; the caller then runs the
    /// frame handler
    pub fn take_frame(&mut self) -> Option<Handle> {
        self.pending_frame.take()
    }

    pub fn frame_pending(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Interval of the running spawn timer
    pub fn spawn_timer_interval(&self) -> Option<f64> {
        self.spawn_timer.map(|(_, interval)| interval)
    }

    pub fn spawn_timer_running(&self) -> bool {
        self.spawn_timer.is_some()
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&mut self) -> Handle {
        if self.pending_frame.is_some() {
            self.double_frame_requests += 1;
        }
        let handle = self.allocate();
        self.pending_frame = Some(handle);
        self.frames_requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: Handle) {
        if self.pending_frame == Some(handle) {
            self.pending_frame = None;
            self.frames_cancelled += 1;
        }
    }

    fn start_spawn_timer(&mut self, interval_ms: f64) -> Handle {
        if self.spawn_timer.is_some() {
            self.double_timer_starts += 1;
        }
        let handle = self.allocate();
        self.spawn_timer = Some((handle, interval_ms));
        self.timers_started += 1;
        handle
    }

    fn cancel_spawn_timer(&mut self, handle: Handle) {
        if matches!(self.spawn_timer, Some((h, _)) if h == handle) {
            self.spawn_timer = None;
            self.timers_cancelled += 1;
        }
    }
}
