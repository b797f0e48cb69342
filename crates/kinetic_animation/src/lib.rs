//! Kinetic Animation System
//!
//! Time-based motion math, independent of any rendering surface.
//!
//! # Features
//!
//! - **Spring Physics**: semi-implicit Euler springs with stiffness, damping, mass
//! - **Easing**: standard curves plus CSS-style cubic beziers
//! - **Keyframe Tracks**: per-cycle value curves for looping animations
//! - **Frame Scheduler**: cancellable per-frame callbacks driving all motion
//! - **Interruptible**: retargeting a spring keeps its velocity

pub mod easing;
pub mod keyframe;
pub mod presets;
pub mod scheduler;
pub mod spring;

pub use easing::Easing;
pub use keyframe::{Keyframe, KeyframeTrack, RepeatMode};
pub use presets::LoopPreset;
pub use scheduler::{FrameControl, FrameId, FrameScheduler, SchedulerHandle};
pub use spring::{advance, SpringConfig, SpringState};
