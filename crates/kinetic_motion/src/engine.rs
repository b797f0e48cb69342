//! Motion engine
//!
//! [`MotionEngine`] owns the three shared resources every effect hangs off:
//! the pointer broadcaster, the frame scheduler and the visibility observer.
//! `create_*` builds an effect, wires it to those resources and returns a
//! handle the host reads once per frame.
//!
//! Handles hold the only strong reference to their effect. Callbacks
//! registered with the engine hold weak references, so dropping a handle (or
//! calling `dispose`) releases every registration the effect made.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use kinetic_animation::{
    FrameControl, FrameId, FrameScheduler, SchedulerHandle, SpringConfig, SpringState,
};
use kinetic_core::error::{ensure_finite, ensure_non_negative, MotionError, Result};
use kinetic_core::geometry::{ElementGeometry, Point, Rect, Size};
use kinetic_core::pointer::{PointerBroadcaster, PointerState, SubscriptionId};
use serde::{Deserialize, Serialize};

use crate::config::{
    CounterConfig, LoopConfig, MagneticConfig, ParallaxConfig, ParallaxMode, RevealConfig,
};
use crate::counter::CounterAnimation;
use crate::looping::LoopAnimation;
use crate::magnetic::MagneticOffset;
use crate::offset::PointerEffect;
use crate::parallax::ParallaxOffset;
use crate::reveal::{Pose, RevealPhase, RevealTransition};
use crate::visibility::{RegionId, VisibilityObserver};

/// Host capabilities and initial viewport
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub viewport: Size,
    /// Whether the host can observe intersections. Without it, reveals and
    /// counters start as soon as they are created.
    pub intersection_observer: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(1280.0, 800.0),
            intersection_observer: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        validate_size(self.viewport)
    }
}

fn validate_size(size: Size) -> Result<()> {
    ensure_non_negative("viewport.width", size.width)?;
    ensure_non_negative("viewport.height", size.height)
}

pub struct MotionEngine {
    config: EngineConfig,
    pointer: Rc<PointerBroadcaster>,
    scheduler: FrameScheduler,
    observer: Rc<VisibilityObserver>,
    viewport: Rc<Cell<Rect>>,
}

impl MotionEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let viewport = Rect::from_size(config.viewport);
        let observer = if config.intersection_observer {
            VisibilityObserver::new(viewport)
        } else {
            VisibilityObserver::unavailable(viewport)
        };
        tracing::debug!(
            "Engine: {}x{} viewport, intersection observer {}",
            viewport.width,
            viewport.height,
            if config.intersection_observer { "on" } else { "off" }
        );
        Ok(Self {
            config,
            pointer: Rc::new(PointerBroadcaster::new()),
            scheduler: FrameScheduler::new(),
            observer: Rc::new(observer),
            viewport: Rc::new(Cell::new(viewport)),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer.current()
    }

    pub fn viewport(&self) -> Rect {
        self.viewport.get()
    }

    // =========================================================================
    // Host input
    // =========================================================================

    /// Pointer moved to `(x, y)` in viewport pixels
    pub fn pointer_move(&self, x: f64, y: f64) {
        self.pointer.publish(x, y);
    }

    /// Viewport changed size. Re-checks visibility against the new bounds.
    pub fn resize(&self, size: Size) -> Result<usize> {
        validate_size(size)?;
        let viewport = Rect::from_size(size);
        self.viewport.set(viewport);
        self.observer.set_viewport(viewport);
        Ok(self.observer.scan())
    }

    /// The page scrolled. Geometry sources already report post-scroll
    /// rectangles; this re-checks visibility and returns how many fired.
    pub fn scroll(&self) -> usize {
        self.observer.scan()
    }

    /// Ratio pushed by a native intersection observer
    pub fn notify_intersection(&self, region: RegionId, ratio: f64) -> bool {
        self.observer.notify(region, ratio)
    }

    /// Run one frame: advance every live animation by `dt` seconds, then
    /// re-check visibility. Effects triggered here start moving next frame.
    pub fn tick(&self, dt: f64) {
        self.scheduler.tick(dt);
        self.observer.scan();
    }

    pub fn frame(&self) -> u64 {
        self.scheduler.frame()
    }

    pub fn elapsed(&self) -> f64 {
        self.scheduler.elapsed()
    }

    // =========================================================================
    // Bookkeeping
    // =========================================================================

    pub fn subscriber_count(&self) -> usize {
        self.pointer.subscriber_count()
    }

    pub fn active_frame_count(&self) -> usize {
        self.scheduler.active_count()
    }

    pub fn watching_count(&self) -> usize {
        self.observer.watching_count()
    }

    pub fn region_count(&self) -> usize {
        self.observer.region_count()
    }

    // =========================================================================
    // Effects
    // =========================================================================

    /// A free-standing spring the host retargets by hand
    pub fn create_spring(&self, config: SpringConfig, initial: f64) -> Result<SpringHandle> {
        let spring = Rc::new(RefCell::new(SpringState::new(config, initial)?));
        let registrations = self.registrations();
        registrations
            .frame
            .set(drive(&self.scheduler.handle(), &spring, |spring, dt| {
                spring.step(dt);
                true
            }));
        tracing::debug!("Engine: created spring {:?}", config);
        Ok(SpringHandle {
            spring,
            registrations,
        })
    }

    /// Pull `element` toward the pointer while hovered
    pub fn create_magnetic(
        &self,
        config: MagneticConfig,
        element: impl ElementGeometry + 'static,
    ) -> Result<OffsetHandle> {
        let effect = MagneticOffset::new(config, Box::new(element))?;
        tracing::debug!("Engine: created magnetic, strength={}", config.strength);
        Ok(self.attach_pointer_effect(Rc::new(RefCell::new(effect))))
    }

    /// Parallax against `element` (local) or the viewport (layer).
    ///
    /// Local mode requires an element. Layer mode ignores it.
    pub fn create_parallax(
        &self,
        config: ParallaxConfig,
        element: Option<Box<dyn ElementGeometry>>,
    ) -> Result<OffsetHandle> {
        let frame: Box<dyn ElementGeometry> = match (config.mode, element) {
            (ParallaxMode::Layer { .. }, _) => Box::new(self.viewport.clone()),
            (ParallaxMode::Local { .. }, Some(element)) => element,
            (ParallaxMode::Local { .. }, None) => {
                return Err(MotionError::invalid(
                    "element",
                    "local parallax needs an element to normalize against",
                ))
            }
        };
        let effect = ParallaxOffset::new(config, frame)?;
        tracing::debug!("Engine: created parallax {:?}", config.mode);
        Ok(self.attach_pointer_effect(Rc::new(RefCell::new(effect))))
    }

    /// Entrance transition that starts the first time `element` is in view.
    ///
    /// Without an element, the region only fires through
    /// [`MotionEngine::notify_intersection`] with [`TransitionHandle::region`].
    pub fn create_reveal(
        &self,
        config: RevealConfig,
        element: Option<Box<dyn ElementGeometry>>,
    ) -> Result<TransitionHandle> {
        let reveal = Rc::new(RefCell::new(RevealTransition::new(config)?));
        let registrations = self.registrations();
        self.on_first_view(
            &registrations,
            &reveal,
            config.threshold,
            element,
            RevealTransition::enter,
            RevealTransition::tick,
        )?;
        Ok(TransitionHandle {
            reveal,
            registrations,
        })
    }

    /// Count-up that starts the first time `element` is in view
    pub fn create_counter(
        &self,
        config: CounterConfig,
        element: Option<Box<dyn ElementGeometry>>,
    ) -> Result<CounterHandle> {
        let counter = Rc::new(RefCell::new(CounterAnimation::new(config)?));
        let registrations = self.registrations();
        self.on_first_view(
            &registrations,
            &counter,
            config.threshold,
            element,
            CounterAnimation::start,
            CounterAnimation::tick,
        )?;
        Ok(CounterHandle {
            counter,
            registrations,
        })
    }

    /// Decorative loop that runs until disposed
    pub fn create_loop(&self, config: LoopConfig) -> Result<LoopHandle> {
        let animation = Rc::new(RefCell::new(LoopAnimation::new(config)?));
        let registrations = self.registrations();
        registrations
            .frame
            .set(drive(&self.scheduler.handle(), &animation, |animation, dt| {
                animation.tick(dt);
                true
            }));
        tracing::debug!("Engine: created loop, period={}s", animation.borrow().config().period);
        Ok(LoopHandle {
            animation,
            registrations,
        })
    }

    fn registrations(&self) -> Rc<Registrations> {
        Rc::new(Registrations {
            pointer: Rc::downgrade(&self.pointer),
            scheduler: self.scheduler.handle(),
            observer: Rc::downgrade(&self.observer),
            subscription: Cell::new(None),
            frame: Cell::new(None),
            region: Cell::new(None),
            disposed: Cell::new(false),
        })
    }

    fn attach_pointer_effect(&self, effect: Rc<RefCell<dyn PointerEffect>>) -> OffsetHandle {
        let registrations = self.registrations();

        let weak = Rc::downgrade(&effect);
        let subscription = self.pointer.subscribe(move |pointer| {
            let Some(effect) = weak.upgrade() else {
                return;
            };
            if let Ok(mut effect) = effect.try_borrow_mut() {
                effect.on_pointer_move(pointer);
            };
        });
        registrations.subscription.set(Some(subscription));
        registrations
            .frame
            .set(drive(&self.scheduler.handle(), &effect, |effect, dt| {
                effect.tick(dt);
                true
            }));

        OffsetHandle {
            effect,
            registrations,
        }
    }

    /// Wire `start` to the effect's first visibility and `step` to the frame
    /// loop from then on. Hosts without an observer start immediately.
    fn on_first_view<T, S, K>(
        &self,
        registrations: &Rc<Registrations>,
        effect: &Rc<RefCell<T>>,
        threshold: f64,
        element: Option<Box<dyn ElementGeometry>>,
        start: S,
        step: K,
    ) -> Result<()>
    where
        T: 'static,
        S: FnOnce(&mut T) + 'static,
        K: FnMut(&mut T, f64) -> bool + 'static,
    {
        let begin = {
            let effect = Rc::downgrade(effect);
            let registrations = Rc::downgrade(registrations);
            move || {
                let (Some(effect), Some(registrations)) = (effect.upgrade(), registrations.upgrade())
                else {
                    return;
                };
                if registrations.is_disposed() {
                    return;
                }
                match effect.try_borrow_mut() {
                    Ok(mut effect) => start(&mut *effect),
                    Err(_) => return,
                }
                registrations
                    .frame
                    .set(drive(&registrations.scheduler, &effect, step));
            }
        };

        if !self.observer.is_available() {
            tracing::warn!(
                "Engine: {}, starting immediately",
                MotionError::ObserverUnavailable
            );
            begin();
            return Ok(());
        }

        let region = self.observer.register(threshold, element, begin)?;
        registrations.region.set(Some(region));
        Ok(())
    }
}

/// Request a frame callback that runs `step` on `target` until it returns
/// false or the target is dropped
fn drive<T, K>(scheduler: &SchedulerHandle, target: &Rc<RefCell<T>>, mut step: K) -> Option<FrameId>
where
    T: ?Sized + 'static,
    K: FnMut(&mut T, f64) -> bool + 'static,
{
    let weak: Weak<RefCell<T>> = Rc::downgrade(target);
    scheduler.request(move |dt| {
        let Some(target) = weak.upgrade() else {
            return FrameControl::Stop;
        };
        let Ok(mut target) = target.try_borrow_mut() else {
            return FrameControl::Continue;
        };
        if step(&mut *target, dt) {
            FrameControl::Continue
        } else {
            FrameControl::Stop
        }
    })
}

/// Everything one effect registered with the engine
struct Registrations {
    pointer: Weak<PointerBroadcaster>,
    scheduler: SchedulerHandle,
    observer: Weak<VisibilityObserver>,
    subscription: Cell<Option<SubscriptionId>>,
    frame: Cell<Option<FrameId>>,
    region: Cell<Option<RegionId>>,
    disposed: Cell<bool>,
}

impl Registrations {
    fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Drop every registration. Safe to call repeatedly.
    fn release(&self) {
        if self.disposed.replace(true) {
            return;
        }
        if let Some(id) = self.subscription.take() {
            if let Some(pointer) = self.pointer.upgrade() {
                pointer.unsubscribe(id);
            }
        }
        if let Some(id) = self.frame.take() {
            self.scheduler.cancel(id);
        }
        if let Some(id) = self.region.take() {
            if let Some(observer) = self.observer.upgrade() {
                observer.unregister(id);
            }
        }
        tracing::trace!("Engine: released registrations");
    }
}

impl Drop for Registrations {
    fn drop(&mut self) {
        self.release();
    }
}

// =============================================================================
// Handles
// =============================================================================

pub struct SpringHandle {
    spring: Rc<RefCell<SpringState>>,
    registrations: Rc<Registrations>,
}

impl SpringHandle {
    pub fn value(&self) -> f64 {
        self.spring.borrow().position
    }

    pub fn velocity(&self) -> f64 {
        self.spring.borrow().velocity
    }

    pub fn target(&self) -> f64 {
        self.spring.borrow().target
    }

    pub fn is_settled(&self) -> bool {
        self.spring.borrow().is_settled()
    }

    /// Retarget, keeping the current velocity. Ignored once disposed.
    pub fn set_target(&self, target: f64) -> Result<()> {
        ensure_finite("target", target)?;
        if self.is_disposed() {
            return Ok(());
        }
        self.spring.borrow_mut().set_target(target)
    }

    /// Teleport and come to rest. Ignored once disposed.
    pub fn jump_to(&self, value: f64) -> Result<()> {
        ensure_finite("value", value)?;
        if self.is_disposed() {
            return Ok(());
        }
        self.spring.borrow_mut().jump_to(value)
    }

    pub fn dispose(&self) {
        self.registrations.release();
    }

    pub fn is_disposed(&self) -> bool {
        self.registrations.is_disposed()
    }
}

/// Smoothed 2D offset from a magnetic or parallax effect
pub struct OffsetHandle {
    effect: Rc<RefCell<dyn PointerEffect>>,
    registrations: Rc<Registrations>,
}

impl OffsetHandle {
    pub fn offset(&self) -> Point {
        self.effect.borrow().offset()
    }

    pub fn target(&self) -> Point {
        self.effect.borrow().target()
    }

    pub fn is_settled(&self) -> bool {
        self.effect.borrow().is_settled()
    }

    pub fn dispose(&self) {
        self.registrations.release();
    }

    pub fn is_disposed(&self) -> bool {
        self.registrations.is_disposed()
    }
}

pub struct TransitionHandle {
    reveal: Rc<RefCell<RevealTransition>>,
    registrations: Rc<Registrations>,
}

impl TransitionHandle {
    pub fn pose(&self) -> Pose {
        self.reveal.borrow().pose()
    }

    pub fn phase(&self) -> RevealPhase {
        self.reveal.borrow().phase()
    }

    pub fn progress(&self) -> f64 {
        self.reveal.borrow().progress()
    }

    /// Region to address with [`MotionEngine::notify_intersection`]
    pub fn region(&self) -> Option<RegionId> {
        self.registrations.region.get()
    }

    pub fn dispose(&self) {
        self.registrations.release();
    }

    pub fn is_disposed(&self) -> bool {
        self.registrations.is_disposed()
    }
}

pub struct CounterHandle {
    counter: Rc<RefCell<CounterAnimation>>,
    registrations: Rc<Registrations>,
}

impl CounterHandle {
    pub fn displayed(&self) -> u64 {
        self.counter.borrow().displayed()
    }

    pub fn progress(&self) -> f64 {
        self.counter.borrow().progress()
    }

    pub fn is_started(&self) -> bool {
        self.counter.borrow().is_started()
    }

    pub fn is_finished(&self) -> bool {
        self.counter.borrow().is_finished()
    }

    pub fn region(&self) -> Option<RegionId> {
        self.registrations.region.get()
    }

    pub fn dispose(&self) {
        self.registrations.release();
    }

    pub fn is_disposed(&self) -> bool {
        self.registrations.is_disposed()
    }
}

pub struct LoopHandle {
    animation: Rc<RefCell<LoopAnimation>>,
    registrations: Rc<Registrations>,
}

impl LoopHandle {
    pub fn value(&self) -> f64 {
        self.animation.borrow().value()
    }

    pub fn cycle(&self) -> u64 {
        self.animation.borrow().cycle()
    }

    pub fn dispose(&self) {
        self.registrations.release();
    }

    pub fn is_disposed(&self) -> bool {
        self.registrations.is_disposed()
    }
}
