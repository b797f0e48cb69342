//! Visibility triggers
//!
//! Detects the first time a region crosses a visibility threshold and fires a
//! one-shot callback. Each region runs its own small state machine:
//!
//! ```text
//! Unobserved --observe--> Watching --enter--> Triggered (terminal)
//! ```
//!
//! Regions are fed either by geometry (re-evaluated by [`VisibilityObserver::scan`]
//! against the current viewport) or by a host that pushes intersection ratios
//! through [`VisibilityObserver::notify`]. Unregistering before the trigger
//! drops the callback without running it.

use kinetic_core::error::{ensure_in_range, MotionError, Result};
use kinetic_core::fsm::{StateMachine, Transition};
use kinetic_core::geometry::{ElementGeometry, Rect};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};

new_key_type! {
    /// Identifier for an observed region
    pub struct RegionId;
}

/// Default fraction of a region that must be on screen
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Lifecycle of an observed region
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisibilityPhase {
    Unobserved,
    Watching,
    Triggered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum VisibilityEvent {
    Observe,
    Enter,
}

type EnterCallback = Box<dyn FnOnce()>;

struct Region {
    fsm: StateMachine<VisibilityPhase, VisibilityEvent>,
    threshold: f64,
    geometry: Option<Box<dyn ElementGeometry>>,
    on_enter: Option<EnterCallback>,
}

impl Region {
    fn new(threshold: f64, geometry: Option<Box<dyn ElementGeometry>>, on_enter: EnterCallback) -> Self {
        let fsm = StateMachine::new(
            VisibilityPhase::Unobserved,
            [
                Transition::new(
                    VisibilityPhase::Unobserved,
                    VisibilityEvent::Observe,
                    VisibilityPhase::Watching,
                ),
                Transition::new(
                    VisibilityPhase::Watching,
                    VisibilityEvent::Enter,
                    VisibilityPhase::Triggered,
                ),
            ],
        );
        Self {
            fsm,
            threshold,
            geometry,
            on_enter: Some(on_enter),
        }
    }

    fn crosses(&self, ratio: f64) -> bool {
        if !ratio.is_finite() {
            return false;
        }
        if self.threshold <= 0.0 {
            ratio > 0.0
        } else {
            ratio >= self.threshold
        }
    }

    /// Move to `Triggered` and hand back the callback, at most once
    fn fire(&mut self) -> Option<EnterCallback> {
        if !self.fsm.is_in(VisibilityPhase::Watching) {
            return None;
        }
        self.fsm.send(VisibilityEvent::Enter);
        self.on_enter.take()
    }
}

/// Registry of observed regions sharing one viewport
pub struct VisibilityObserver {
    available: bool,
    viewport: Cell<Rect>,
    regions: RefCell<SlotMap<RegionId, Region>>,
}

impl VisibilityObserver {
    /// Observer for a host with intersection support
    pub fn new(viewport: Rect) -> Self {
        Self {
            available: true,
            viewport: Cell::new(viewport),
            regions: RefCell::new(SlotMap::with_key()),
        }
    }

    /// Observer for a host without intersection support.
    /// Every registration fails with [`MotionError::ObserverUnavailable`].
    pub fn unavailable(viewport: Rect) -> Self {
        Self {
            available: false,
            ..Self::new(viewport)
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn viewport(&self) -> Rect {
        self.viewport.get()
    }

    pub fn set_viewport(&self, viewport: Rect) {
        self.viewport.set(viewport);
    }

    /// Start watching a region.
    ///
    /// `on_enter` runs synchronously on the caller's stack, from this call,
    /// [`scan`](Self::scan) or [`notify`](Self::notify), never from a deferred
    /// task. A geometry-backed region that is already above threshold fires
    /// immediately, before this returns.
    pub fn register<F>(
        &self,
        threshold: f64,
        geometry: Option<Box<dyn ElementGeometry>>,
        on_enter: F,
    ) -> Result<RegionId>
    where
        F: FnOnce() + 'static,
    {
        if !self.available {
            return Err(MotionError::ObserverUnavailable);
        }
        ensure_in_range("threshold", threshold, 0.0, 1.0)?;

        let mut region = Region::new(threshold, geometry, Box::new(on_enter));
        region.fsm.send(VisibilityEvent::Observe);
        let id = self.regions.borrow_mut().insert(region);
        tracing::trace!("Visibility: watching {:?} at threshold {}", id, threshold);

        self.scan_one(id);
        Ok(id)
    }

    /// Stop observing. Pending callbacks are dropped unrun.
    pub fn unregister(&self, id: RegionId) -> bool {
        self.regions.borrow_mut().remove(id).is_some()
    }

    pub fn phase(&self, id: RegionId) -> Option<VisibilityPhase> {
        self.regions.borrow().get(id).map(|r| r.fsm.current_state())
    }

    /// Number of regions still waiting for their first entry
    pub fn watching_count(&self) -> usize {
        self.regions
            .borrow()
            .values()
            .filter(|r| r.fsm.is_in(VisibilityPhase::Watching))
            .count()
    }

    /// Total registered regions, triggered or not
    pub fn region_count(&self) -> usize {
        self.regions.borrow().len()
    }

    /// Push an intersection ratio for one region. Returns true if it fired.
    pub fn notify(&self, id: RegionId, ratio: f64) -> bool {
        let callback = {
            let mut regions = self.regions.borrow_mut();
            match regions.get_mut(id) {
                Some(region) if region.crosses(ratio) => region.fire(),
                _ => None,
            }
        };
        Self::run(id, callback)
    }

    /// Re-evaluate every geometry-backed region against the viewport.
    /// Returns how many regions fired.
    pub fn scan(&self) -> usize {
        let viewport = self.viewport.get();
        let fired: SmallVec<[(RegionId, EnterCallback); 4]> = {
            let mut regions = self.regions.borrow_mut();
            regions
                .iter_mut()
                .filter_map(|(id, region)| {
                    let ratio = Self::measure(id, region, &viewport)?;
                    if region.crosses(ratio) {
                        region.fire().map(|cb| (id, cb))
                    } else {
                        None
                    }
                })
                .collect()
        };

        let count = fired.len();
        for (id, callback) in fired {
            Self::run(id, Some(callback));
        }
        count
    }

    fn scan_one(&self, id: RegionId) -> bool {
        let viewport = self.viewport.get();
        let callback = {
            let mut regions = self.regions.borrow_mut();
            let Some(region) = regions.get_mut(id) else {
                return false;
            };
            match Self::measure(id, region, &viewport) {
                Some(ratio) if region.crosses(ratio) => region.fire(),
                _ => None,
            }
        };
        Self::run(id, callback)
    }

    fn measure(id: RegionId, region: &Region, viewport: &Rect) -> Option<f64> {
        if !region.fsm.is_in(VisibilityPhase::Watching) {
            return None;
        }
        match region.geometry.as_ref()?.bounding_rect() {
            Ok(rect) => Some(rect.visible_fraction(viewport)),
            Err(err) => {
                tracing::trace!("Visibility: skipping {:?}: {}", id, err);
                None
            }
        }
    }

    fn run(id: RegionId, callback: Option<EnterCallback>) -> bool {
        match callback {
            Some(callback) => {
                tracing::debug!("Visibility: {:?} entered view", id);
                callback();
                true
            }
            None => false,
        }
    }
}
