//! Geometry primitives in viewport pixel space
//!
//! The host renderer owns layout. Effects only ever see rectangles it hands
//! back through [`ElementGeometry`].

use crate::error::{MotionError, Result};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

/// A point in viewport pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle (origin at top-left)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Hit test, edges inclusive
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Map a point into `[-1, 1]` on both axes relative to this rectangle.
    ///
    /// Points outside are clamped. A degenerate axis maps to 0.
    pub fn normalize(&self, p: Point) -> Point {
        Point::new(
            normalize_axis(p.x, self.x, self.width),
            normalize_axis(p.y, self.y, self.height),
        )
    }

    /// Overlapping region of two rectangles, if any
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 > x0 && y1 > y0 {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        } else {
            None
        }
    }

    /// Fraction of this rectangle's area that lies inside `viewport`.
    ///
    /// Zero-area rectangles count as fully visible when their origin is inside
    /// the viewport, so an empty region still triggers once scrolled to.
    pub fn visible_fraction(&self, viewport: &Rect) -> f64 {
        let area = self.area();
        if area <= 0.0 {
            return if viewport.contains(Point::new(self.x, self.y)) {
                1.0
            } else {
                0.0
            };
        }
        self.intersection(viewport)
            .map(|r| (r.area() / area).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }
}

fn normalize_axis(value: f64, origin: f64, extent: f64) -> f64 {
    if extent <= 0.0 || !extent.is_finite() {
        return 0.0;
    }
    (((value - origin) / extent) * 2.0 - 1.0).clamp(-1.0, 1.0)
}

/// Host-provided geometry for a visual element.
///
/// Returning [`MotionError::DetachedElement`] tells the effect the element
/// is gone; the effect skips that tick instead of failing.
pub trait ElementGeometry {
    fn bounding_rect(&self) -> Result<Rect>;
}

/// A fixed rectangle
impl ElementGeometry for Rect {
    fn bounding_rect(&self) -> Result<Rect> {
        Ok(*self)
    }
}

/// A shared, host-updated slot. `None` means detached.
impl ElementGeometry for Rc<Cell<Option<Rect>>> {
    fn bounding_rect(&self) -> Result<Rect> {
        self.get().ok_or(MotionError::DetachedElement)
    }
}

/// A shared, host-updated rectangle that is always attached (e.g. the viewport).
impl ElementGeometry for Rc<Cell<Rect>> {
    fn bounding_rect(&self) -> Result<Rect> {
        Ok(self.get())
    }
}
