//! Kinetic Motion
//!
//! Pointer- and scroll-driven motion effects for a host renderer. The engine
//! never draws anything: each effect produces numbers (offsets, poses,
//! counters) that the host reads once per displayed frame.
//!
//! # Effects
//!
//! - **Magnetic**: elements lean toward the cursor while hovered
//! - **Parallax**: layers drift by depth as the pointer moves
//! - **Reveal**: one-shot entrance the first time an element is seen
//! - **Counter**: ease-out count-up on first view
//! - **Loop**: infinite keyframe loops with staggered phase
//!
//! # Example
//!
//! ```rust
//! use kinetic_core::geometry::{Rect, Size};
//! use kinetic_motion::{EngineConfig, MagneticConfig, MotionEngine, RevealConfig, RevealPhase};
//!
//! let engine = MotionEngine::new(EngineConfig {
//!     viewport: Size::new(1000.0, 800.0),
//!     intersection_observer: true,
//! })
//! .unwrap();
//!
//! let button = engine
//!     .create_magnetic(MagneticConfig::default(), Rect::new(100.0, 100.0, 200.0, 100.0))
//!     .unwrap();
//! let hero = engine
//!     .create_reveal(RevealConfig::default(), Some(Box::new(Rect::new(0.0, 0.0, 400.0, 300.0))))
//!     .unwrap();
//!
//! engine.pointer_move(280.0, 110.0);
//! for _ in 0..60 {
//!     engine.tick(1.0 / 60.0);
//! }
//!
//! assert!(button.offset().x > 0.0);
//! assert_eq!(hero.phase(), RevealPhase::Visible);
//! ```

pub mod config;
pub mod counter;
pub mod engine;
pub mod looping;
pub mod magnetic;
pub mod offset;
pub mod parallax;
pub mod reveal;
pub mod visibility;

pub use config::{
    CounterConfig, Direction, LoopConfig, LoopShape, MagneticConfig, MotionConfig, ParallaxConfig,
    ParallaxMode, RevealConfig,
};
pub use counter::CounterAnimation;
pub use engine::{
    CounterHandle, EngineConfig, LoopHandle, MotionEngine, OffsetHandle, SpringHandle,
    TransitionHandle,
};
pub use looping::LoopAnimation;
pub use magnetic::MagneticOffset;
pub use offset::{PointerEffect, SpringPair};
pub use parallax::ParallaxOffset;
pub use reveal::{Pose, RevealPhase, RevealTransition};
pub use visibility::{RegionId, VisibilityObserver, VisibilityPhase, DEFAULT_THRESHOLD};
