//! Scene file handling (scene.toml)
//!
//! A scene lists effects with their document rectangles, a pointer path and
//! a scroll schedule:
//!
//! ```toml
//! duration = 3.0
//!
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [[effect]]
//! name = "cta"
//! kind = "magnetic"
//! strength = 0.4
//! rect = { x = 540, y = 600, width = 200, height = 60 }
//!
//! [[pointer]]
//! at = 0.5
//! x = 640
//! y = 630
//!
//! [[scroll]]
//! at = 1.0
//! y = 400
//! ```

use anyhow::{Context, Result};
use kinetic_core::geometry::{Rect, Size};
use kinetic_motion::{EngineConfig, MotionConfig, ParallaxMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level scene description
#[derive(Debug, Deserialize, Serialize)]
pub struct Scene {
    /// Seconds to simulate
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default, rename = "effect")]
    pub effects: Vec<EffectSpec>,
    #[serde(default, rename = "pointer")]
    pub pointer: Vec<PointerWaypoint>,
    #[serde(default, rename = "scroll")]
    pub scroll: Vec<ScrollEvent>,
}

fn default_duration() -> f64 {
    3.0
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ViewportConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    /// Simulate a host with intersection observation
    #[serde(default = "default_true")]
    pub intersection_observer: bool,
}

fn default_width() -> f64 {
    1280.0
}

fn default_height() -> f64 {
    800.0
}

fn default_true() -> bool {
    true
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            intersection_observer: true,
        }
    }
}

/// One effect instance
#[derive(Debug, Deserialize, Serialize)]
pub struct EffectSpec {
    pub name: String,
    /// Position in document coordinates (before scrolling)
    #[serde(default)]
    pub rect: Option<Rect>,
    /// Target a spring effect heads for from the first frame
    #[serde(default)]
    pub to: Option<f64>,
    #[serde(flatten)]
    pub motion: MotionConfig,
}

impl EffectSpec {
    fn needs_rect(&self) -> bool {
        match &self.motion {
            MotionConfig::Magnetic(_) => true,
            MotionConfig::Parallax(config) => matches!(config.mode, ParallaxMode::Local { .. }),
            _ => false,
        }
    }
}

/// Pointer position at time `at`. Positions between waypoints are linear.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct PointerWaypoint {
    pub at: f64,
    pub x: f64,
    pub y: f64,
}

/// Page scroll offset that takes effect at time `at`
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ScrollEvent {
    pub at: f64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Scene {
    /// Load and validate a scene file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("No scene found at {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let scene = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(scene)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut scene: Scene = toml::from_str(content)?;
        scene.validate()?;
        scene.pointer.sort_by(|a, b| a.at.total_cmp(&b.at));
        scene.scroll.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(scene)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            viewport: Size::new(self.viewport.width, self.viewport.height),
            intersection_observer: self.viewport.intersection_observer,
        }
    }

    /// Check everything the engine would reject, with the offending name
    pub fn validate(&self) -> Result<()> {
        if !(self.duration >= 0.0) || !self.duration.is_finite() {
            anyhow::bail!("duration must be a finite, non-negative number of seconds");
        }
        self.engine_config()
            .validate()
            .context("Invalid [viewport]")?;

        let mut names = std::collections::HashSet::new();
        for effect in &self.effects {
            if !names.insert(effect.name.as_str()) {
                anyhow::bail!("Duplicate effect name `{}`", effect.name);
            }
            effect
                .motion
                .validate()
                .with_context(|| format!("Invalid effect `{}`", effect.name))?;
            if effect.needs_rect() && effect.rect.is_none() {
                anyhow::bail!("Effect `{}` needs a `rect`", effect.name);
            }
        }

        for waypoint in &self.pointer {
            if ![waypoint.at, waypoint.x, waypoint.y].iter().all(|v| v.is_finite()) {
                anyhow::bail!("Pointer waypoint at {} has a non-finite field", waypoint.at);
            }
        }
        for event in &self.scroll {
            if ![event.at, event.x, event.y].iter().all(|v| v.is_finite()) {
                anyhow::bail!("Scroll event at {} has a non-finite field", event.at);
            }
        }
        Ok(())
    }
}
