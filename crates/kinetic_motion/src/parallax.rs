//! Parallax offset
//!
//! Maps the pointer's normalized position (`[-1, 1]` on each axis) to a
//! bounded offset:
//!
//! - **Local**: normalized against the wrapped element, `±20 × intensity` px.
//!   Leaving the wrapper recenters it.
//! - **Layer**: normalized against the viewport, `±10 × depth` px. Layers with
//!   larger depth move further for the same pointer, which reads as depth.

use kinetic_core::error::Result;
use kinetic_core::geometry::{ElementGeometry, Point};
use kinetic_core::pointer::PointerState;

use crate::config::{ParallaxConfig, ParallaxMode};
use crate::offset::{PointerEffect, SpringPair};

pub struct ParallaxOffset {
    config: ParallaxConfig,
    springs: SpringPair,
    /// Wrapper rectangle (local) or viewport (layer)
    frame: Box<dyn ElementGeometry>,
}

impl ParallaxOffset {
    pub fn new(config: ParallaxConfig, frame: Box<dyn ElementGeometry>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            springs: SpringPair::new(config.spring)?,
            config,
            frame,
        })
    }

    pub fn config(&self) -> &ParallaxConfig {
        &self.config
    }

    /// Offset target for a normalized pointer position
    pub fn displacement(mode: ParallaxMode, normalized: Point) -> Point {
        let range = mode.range();
        Point::new(normalized.x * range, normalized.y * range)
    }

    fn retarget(&mut self, target: Point) {
        if let Err(err) = self.springs.set_target(target) {
            tracing::warn!("Parallax: ignoring target {:?}: {}", target, err);
        }
    }
}

impl PointerEffect for ParallaxOffset {
    fn on_pointer_move(&mut self, pointer: PointerState) {
        let rect = match self.frame.bounding_rect() {
            Ok(rect) => rect,
            Err(err) => {
                tracing::trace!("Parallax: skipping pointer move: {}", err);
                return;
            }
        };

        let point = pointer.point();
        if matches!(self.config.mode, ParallaxMode::Local { .. }) && !rect.contains(point) {
            self.on_pointer_leave();
            return;
        }

        let target = Self::displacement(self.config.mode, rect.normalize(point));
        self.retarget(target);
    }

    fn on_pointer_leave(&mut self) {
        if matches!(self.config.mode, ParallaxMode::Local { .. }) {
            self.retarget(Point::default());
        }
    }

    fn tick(&mut self, dt: f64) {
        self.springs.advance(dt);
    }

    fn offset(&self) -> Point {
        self.springs.position()
    }

    fn target(&self) -> Point {
        self.springs.target()
    }

    fn is_settled(&self) -> bool {
        self.springs.is_settled()
    }
}
