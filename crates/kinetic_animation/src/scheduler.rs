//! Frame scheduler
//!
//! Owns every recurring per-frame callback and runs them once per host frame.
//! This is the only place motion state advances in time. Effects keep a
//! [`SchedulerHandle`] (a weak reference) so they can cancel their own
//! registration on teardown without keeping the scheduler alive.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Registration handle for a frame callback
    pub struct FrameId;
}

/// Returned by a frame callback to keep or drop its registration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

/// Per-frame callback, receives the frame delta in seconds
pub type FrameCallback = Rc<RefCell<dyn FnMut(f64) -> FrameControl>>;

struct SchedulerInner {
    callbacks: SlotMap<FrameId, FrameCallback>,
    frame: u64,
    elapsed: f64,
}

/// The frame scheduler that ticks all active motion
pub struct FrameScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                callbacks: SlotMap::with_key(),
                frame: 0,
                elapsed: 0.0,
            })),
        }
    }

    /// Weak handle for registering and cancelling callbacks
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Run every registered callback once with `dt` seconds.
    ///
    /// Callbacks may register or cancel other callbacks while running.
    /// Ones registered during the tick first run on the next tick.
    pub fn tick(&self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let pending: SmallVec<[(FrameId, FrameCallback); 16]> = {
            let mut inner = self.inner.borrow_mut();
            inner.frame += 1;
            inner.elapsed += dt;
            inner
                .callbacks
                .iter()
                .map(|(id, cb)| (id, cb.clone()))
                .collect()
        };

        for (id, callback) in pending {
            if !self.inner.borrow().callbacks.contains_key(id) {
                continue;
            }
            let control = match callback.try_borrow_mut() {
                Ok(mut cb) => (*cb)(dt),
                Err(_) => {
                    tracing::trace!("Scheduler: skipping re-entrant frame callback {:?}", id);
                    FrameControl::Continue
                }
            };
            if control == FrameControl::Stop {
                self.inner.borrow_mut().callbacks.remove(id);
            }
        }
    }

    /// Number of live frame registrations
    pub fn active_count(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    pub fn has_active(&self) -> bool {
        self.active_count() > 0
    }

    /// Number of ticks run so far
    pub fn frame(&self) -> u64 {
        self.inner.borrow().frame
    }

    /// Total simulated seconds across all ticks
    pub fn elapsed(&self) -> f64 {
        self.inner.borrow().elapsed
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Weak reference to a [`FrameScheduler`]
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Register a recurring callback. Returns `None` if the scheduler is gone.
    pub fn request<F>(&self, callback: F) -> Option<FrameId>
    where
        F: FnMut(f64) -> FrameControl + 'static,
    {
        let inner = self.inner.upgrade()?;
        let callback: FrameCallback = Rc::new(RefCell::new(callback));
        let id = inner.borrow_mut().callbacks.insert(callback);
        Some(id)
    }

    /// Cancel a registration. Unknown ids are ignored.
    pub fn cancel(&self, id: FrameId) -> bool {
        match self.inner.upgrade() {
            Some(inner) => inner.borrow_mut().callbacks.remove(id).is_some(),
            None => false,
        }
    }

    pub fn is_registered(&self, id: FrameId) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.borrow().callbacks.contains_key(id))
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
