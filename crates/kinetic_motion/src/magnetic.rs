//! Magnetic offset
//!
//! While the pointer is over an element, the element is pulled toward it:
//!
//! ```text
//! target = (pointer - element center) * strength
//! ```
//!
//! Leaving the element retargets to `(0, 0)` and the spring eases it home.
//! The hit area is the element's bounding rectangle, with no margin or falloff.

use kinetic_core::error::Result;
use kinetic_core::geometry::{ElementGeometry, Point, Rect};
use kinetic_core::pointer::PointerState;

use crate::config::MagneticConfig;
use crate::offset::{PointerEffect, SpringPair};

pub struct MagneticOffset {
    config: MagneticConfig,
    springs: SpringPair,
    geometry: Box<dyn ElementGeometry>,
    hovering: bool,
}

impl MagneticOffset {
    pub fn new(config: MagneticConfig, geometry: Box<dyn ElementGeometry>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            springs: SpringPair::new(config.spring)?,
            config,
            geometry,
            hovering: false,
        })
    }

    pub fn config(&self) -> &MagneticConfig {
        &self.config
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Offset target for a pointer over `rect`
    pub fn pull(rect: &Rect, pointer: PointerState, strength: f64) -> Point {
        let center = rect.center();
        Point::new(
            (pointer.x - center.x) * strength,
            (pointer.y - center.y) * strength,
        )
    }

    fn retarget(&mut self, target: Point) {
        if let Err(err) = self.springs.set_target(target) {
            tracing::warn!("Magnetic: ignoring target {:?}: {}", target, err);
        }
    }
}

impl PointerEffect for MagneticOffset {
    fn on_pointer_move(&mut self, pointer: PointerState) {
        let rect = match self.geometry.bounding_rect() {
            Ok(rect) => rect,
            Err(err) => {
                tracing::trace!("Magnetic: skipping pointer move: {}", err);
                return;
            }
        };

        if rect.contains(pointer.point()) {
            self.hovering = true;
            let target = Self::pull(&rect, pointer, self.config.strength);
            self.retarget(target);
        } else if self.hovering {
            self.on_pointer_leave();
        }
    }

    fn on_pointer_leave(&mut self) {
        self.hovering = false;
        self.retarget(Point::default());
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const DT: f64 = 1.0 / 60.0;

    fn button() -> Rect {
        Rect::new(100.0, 100.0, 200.0, 100.0)
    }

    fn magnetic(strength: f64) -> MagneticOffset {
        let config = MagneticConfig {
            strength,
            ..Default::default()
        };
        MagneticOffset::new(config, Box::new(button())).unwrap()
    }

    #[test]
    fn test_center_yields_zero_target() {
        for strength in [0.1, 0.3, 0.5, 1.0] {
            let mut effect = magnetic(strength);
            effect.on_pointer_move(PointerState::new(200.0, 150.0));
            assert_eq!(effect.target(), Point::new(0.0, 0.0));
        }
    }

    #[test]
    fn test_pull_scales_with_strength() {
        let mut effect = magnetic(0.5);
        effect.on_pointer_move(PointerState::new(280.0, 110.0));
        assert_eq!(effect.target(), Point::new(40.0, -20.0));
        assert!(effect.is_hovering());
    }

    #[test]
    fn test_target_change_has_no_immediate_effect() {
        let mut effect = magnetic(0.5);
        effect.on_pointer_move(PointerState::new(280.0, 110.0));
        assert_eq!(effect.offset(), Point::new(0.0, 0.0));
        effect.tick(DT);
        assert!(effect.offset().x > 0.0);
        assert!(effect.offset().y < 0.0);
    }

    #[test]
    fn test_leave_eases_back_to_rest() {
        let mut effect = magnetic(0.5);
        effect.on_pointer_move(PointerState::new(280.0, 110.0));
        for _ in 0..30 {
            effect.tick(DT);
        }
        let pulled = effect.offset();
        assert!(pulled.x > 10.0);

        // Exiting the rectangle counts as leaving
        effect.on_pointer_move(PointerState::new(500.0, 500.0));
        assert!(!effect.is_hovering());
        assert_eq!(effect.target(), Point::new(0.0, 0.0));

        // No snap: the next frame is still near the pulled position
        effect.tick(DT);
        assert!(effect.offset().x > pulled.x * 0.5);

        for _ in 0..600 {
            effect.tick(DT);
        }
        assert!(effect.is_settled());
        assert_eq!(effect.offset(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_outside_pointer_ignored_when_not_hovering() {
        let mut effect = magnetic(0.5);
        effect.on_pointer_move(PointerState::new(0.0, 0.0));
        assert!(!effect.is_hovering());
        assert_eq!(effect.target(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_detached_element_is_noop() {
        let slot: Rc<Cell<Option<Rect>>> = Rc::new(Cell::new(Some(button())));
        let mut effect =
            MagneticOffset::new(MagneticConfig::default(), Box::new(slot.clone())).unwrap();
        effect.on_pointer_move(PointerState::new(280.0, 110.0));
        let target = effect.target();

        slot.set(None);
        effect.on_pointer_move(PointerState::new(120.0, 190.0));
        assert_eq!(effect.target(), target);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MagneticConfig {
            strength: f64::INFINITY,
            ..Default::default()
        };
        assert!(MagneticOffset::new(config, Box::new(button())).is_err());
    }
}
