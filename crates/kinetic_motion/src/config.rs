//! Effect configuration
//!
//! Every effect takes an immutable config at construction. All configs are
//! serde-friendly with defaults, so partial TOML tables are valid:
//!
//! ```toml
//! kind = "reveal"
//! direction = "left"
//! delay = 0.2
//! ```

use kinetic_animation::{Easing, KeyframeTrack, LoopPreset, RepeatMode, SpringConfig};
use kinetic_core::error::{
    ensure_finite, ensure_in_range, ensure_non_negative, ensure_positive, MotionError, Result,
};
use serde::{Deserialize, Serialize};

use crate::visibility::DEFAULT_THRESHOLD;

/// Pointer-following pull toward the cursor
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagneticConfig {
    /// Fraction of the pointer's distance from center applied as offset
    pub strength: f64,
    pub spring: SpringConfig,
}

impl Default for MagneticConfig {
    fn default() -> Self {
        Self {
            strength: 0.3,
            spring: SpringConfig::magnetic(),
        }
    }
}

impl MagneticConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("strength", self.strength)?;
        self.spring.validate()
    }
}

/// Which frame of reference a parallax effect normalizes against
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ParallaxMode {
    /// Relative to the wrapped element; output spans `±20 × intensity` px
    Local { intensity: f64 },
    /// Relative to the viewport; output spans `±10 × depth` px
    Layer { depth: f64 },
}

impl ParallaxMode {
    /// Output span in pixels for a fully deflected pointer
    pub fn range(&self) -> f64 {
        match *self {
            ParallaxMode::Local { intensity } => 20.0 * intensity,
            ParallaxMode::Layer { depth } => 10.0 * depth,
        }
    }
}

/// Pointer-driven depth offset
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParallaxConfig {
    #[serde(flatten)]
    pub mode: ParallaxMode,
    #[serde(default = "SpringConfig::parallax")]
    pub spring: SpringConfig,
}

impl ParallaxConfig {
    pub fn local(intensity: f64) -> Self {
        Self {
            mode: ParallaxMode::Local { intensity },
            spring: SpringConfig::parallax(),
        }
    }

    pub fn layer(depth: f64) -> Self {
        Self {
            mode: ParallaxMode::Layer { depth },
            spring: SpringConfig::parallax(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.mode {
            ParallaxMode::Local { intensity } => ensure_finite("intensity", intensity)?,
            ParallaxMode::Layer { depth } => ensure_finite("depth", depth)?,
        }
        self.spring.validate()
    }
}

/// Off-screen pose a reveal starts from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Rises into place from below
    #[default]
    Up,
    /// Drops into place from above
    Down,
    /// Slides in from the right, moving left
    Left,
    /// Slides in from the left, moving right
    Right,
    /// Grows from 0.8x
    Scale,
}

impl Direction {
    pub const ALL: [Direction; 5] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::Scale,
    ];
}

/// One-shot entrance transition
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub direction: Direction,
    /// Seconds between entering view and starting to move
    pub delay: f64,
    /// Seconds from hidden to visible
    pub duration: f64,
    /// Visible fraction that counts as "in view"
    pub threshold: f64,
    pub easing: Easing,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Up,
            delay: 0.0,
            duration: 0.6,
            threshold: DEFAULT_THRESHOLD,
            easing: Easing::REVEAL,
        }
    }
}

impl RevealConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("delay", self.delay)?;
        ensure_non_negative("duration", self.duration)?;
        ensure_in_range("threshold", self.threshold, 0.0, 1.0)?;
        validate_easing(self.easing)
    }
}

/// Count-up from zero on first view
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub target: u64,
    /// Seconds from 0 to `target`
    pub duration: f64,
    /// Seconds between entering view and counting
    pub delay: f64,
    pub threshold: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            target: 0,
            duration: 2.5,
            delay: 0.0,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl CounterConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("duration", self.duration)?;
        ensure_non_negative("delay", self.delay)?;
        ensure_in_range("threshold", self.threshold, 0.0, 1.0)
    }
}

/// Where a loop's keyframes come from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoopShape {
    Preset(LoopPreset),
    Keyframes { keyframes: KeyframeTrack },
}

impl LoopShape {
    pub fn track(&self) -> Result<KeyframeTrack> {
        match self {
            LoopShape::Preset(preset) => preset.track(),
            LoopShape::Keyframes { keyframes } => Ok(keyframes.clone()),
        }
    }
}

/// Infinite decorative animation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    #[serde(flatten)]
    pub shape: LoopShape,
    /// Seconds per cycle
    #[serde(default = "default_period")]
    pub period: f64,
    /// Seconds before the first cycle, used to stagger siblings
    #[serde(default)]
    pub delay: f64,
    #[serde(default)]
    pub repeat: RepeatMode,
}

fn default_period() -> f64 {
    3.0
}

impl LoopConfig {
    pub fn new(shape: LoopShape) -> Self {
        Self {
            shape,
            period: default_period(),
            delay: 0.0,
            repeat: RepeatMode::Loop,
        }
    }

    pub fn preset(preset: LoopPreset) -> Self {
        Self::new(LoopShape::Preset(preset))
    }

    pub fn with_period(mut self, period: f64) -> Self {
        self.period = period;
        self
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_repeat(mut self, repeat: RepeatMode) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("period", self.period)?;
        ensure_non_negative("delay", self.delay)?;
        self.shape.track().map(|_| ())
    }
}

/// Any effect's config, tagged by `kind`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionConfig {
    Spring(SpringConfig),
    Magnetic(MagneticConfig),
    Parallax(ParallaxConfig),
    Reveal(RevealConfig),
    Counter(CounterConfig),
    Loop(LoopConfig),
}

impl MotionConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            MotionConfig::Spring(c) => c.validate(),
            MotionConfig::Magnetic(c) => c.validate(),
            MotionConfig::Parallax(c) => c.validate(),
            MotionConfig::Reveal(c) => c.validate(),
            MotionConfig::Counter(c) => c.validate(),
            MotionConfig::Loop(c) => c.validate(),
        }
    }
}

fn validate_easing(easing: Easing) -> Result<()> {
    if let Easing::CubicBezier(x1, y1, x2, y2) = easing {
        ensure_in_range("easing.x1", x1, 0.0, 1.0)?;
        ensure_in_range("easing.x2", x2, 0.0, 1.0)?;
        if !y1.is_finite() || !y2.is_finite() {
            return Err(MotionError::invalid("easing", "control points must be finite"));
        }
    }
    Ok(())
}
