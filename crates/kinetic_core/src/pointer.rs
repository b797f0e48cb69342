//! Pointer broadcasting
//!
//! A single-writer, many-reader source of the current pointer position.
//! The host application owns one [`PointerBroadcaster`] at its root and hands
//! an `Rc` of it to every effect that needs pointer input. Effects register a
//! callback with [`PointerBroadcaster::subscribe`] and must release it with
//! [`PointerBroadcaster::unsubscribe`] on teardown.
//!
//! Everything runs on the host's event/frame loop thread, so interior
//! mutability via `Cell`/`RefCell` is enough.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::geometry::Point;

new_key_type! {
    /// Registration handle for a pointer subscriber
    pub struct SubscriptionId;
}

/// Current pointer coordinates in viewport pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    pub x: f64,
    pub y: f64,
}

impl PointerState {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Pointer subscriber callback
pub type PointerCallback = Rc<RefCell<dyn FnMut(PointerState)>>;

/// Process-wide pointer state with explicit subscriptions
pub struct PointerBroadcaster {
    state: Cell<PointerState>,
    subscribers: RefCell<SlotMap<SubscriptionId, PointerCallback>>,
}

impl PointerBroadcaster {
    /// Create a broadcaster. The pointer starts at `(0, 0)`.
    pub fn new() -> Self {
        Self {
            state: Cell::new(PointerState::default()),
            subscribers: RefCell::new(SlotMap::with_key()),
        }
    }

    /// Snapshot of the latest pointer position
    pub fn current(&self) -> PointerState {
        self.state.get()
    }

    /// Register a callback invoked on every pointer move
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(PointerState) + 'static,
    {
        let callback: PointerCallback = Rc::new(RefCell::new(callback));
        self.subscribers.borrow_mut().insert(callback)
    }

    /// Remove a subscriber. Unknown or already-removed ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.borrow_mut().remove(id).is_some()
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscribers.borrow().contains_key(id)
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Record a pointer move and notify subscribers.
    ///
    /// Every subscriber sees the same snapshot. Subscribers may subscribe or
    /// unsubscribe from inside their callback; a subscriber removed during
    /// dispatch is not called afterwards.
    pub fn publish(&self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            tracing::warn!("Pointer: ignoring non-finite position ({x}, {y})");
            return;
        }

        let snapshot = PointerState::new(x, y);
        self.state.set(snapshot);

        let pending: SmallVec<[(SubscriptionId, PointerCallback); 8]> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(id, cb)| (id, cb.clone()))
            .collect();

        for (id, callback) in pending {
            if !self.is_subscribed(id) {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut cb) => (*cb)(snapshot),
                Err(_) => tracing::trace!("Pointer: skipping re-entrant subscriber {:?}", id),
            }
        }
    }
}

impl Default for PointerBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
