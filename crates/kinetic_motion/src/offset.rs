//! Spring-smoothed 2D offsets shared by pointer-driven effects

use kinetic_animation::{advance, SpringConfig, SpringState};
use kinetic_core::error::Result;
use kinetic_core::geometry::Point;
use kinetic_core::pointer::PointerState;

/// An effect that turns pointer input into a smoothed offset
pub trait PointerEffect {
    /// React to a pointer move (retargets, never moves the output directly)
    fn on_pointer_move(&mut self, pointer: PointerState);

    /// The pointer left the element's hit area
    fn on_pointer_leave(&mut self);

    /// Advance the springs by `dt` seconds
    fn tick(&mut self, dt: f64);

    /// Current smoothed offset in pixels
    fn offset(&self) -> Point;

    /// Offset the springs are heading toward
    fn target(&self) -> Point;

    fn is_settled(&self) -> bool;
}

/// Independent x/y springs
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringPair {
    pub x: SpringState,
    pub y: SpringState,
}

impl SpringPair {
    /// Both axes at rest at zero
    pub fn new(config: SpringConfig) -> Result<Self> {
        Ok(Self {
            x: SpringState::new(config, 0.0)?,
            y: SpringState::new(config, 0.0)?,
        })
    }

    pub fn set_target(&mut self, target: Point) -> Result<()> {
        self.x.set_target(target.x)?;
        self.y.set_target(target.y)
    }

    pub fn advance(&mut self, dt: f64) -> Point {
        Point::new(advance(&mut self.x, dt), advance(&mut self.y, dt))
    }

    pub fn position(&self) -> Point {
        Point::new(self.x.position, self.y.position)
    }

    pub fn target(&self) -> Point {
        Point::new(self.x.target, self.y.target)
    }

    pub fn is_settled(&self) -> bool {
        self.x.is_settled() && self.y.is_settled()
    }
}
