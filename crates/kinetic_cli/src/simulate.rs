//! Headless scene replay
//!
//! Builds every effect in a [`Scene`], then steps the engine at a fixed frame
//! rate while replaying the pointer path and scroll schedule.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result};
use kinetic_core::error::{MotionError, Result as MotionResult};
use kinetic_core::geometry::{ElementGeometry, Point, Rect};
use kinetic_motion::{
    CounterHandle, LoopHandle, MotionConfig, MotionEngine, OffsetHandle, Pose, RevealPhase,
    SpringHandle, TransitionHandle,
};
use serde::Serialize;

use crate::scene::{PointerWaypoint, Scene};

/// A document rectangle seen through the current scroll offset
struct ScrolledRect {
    rect: Rect,
    scroll: Rc<Cell<Point>>,
}

impl ElementGeometry for ScrolledRect {
    fn bounding_rect(&self) -> MotionResult<Rect> {
        let scroll = self.scroll.get();
        Ok(Rect::new(
            self.rect.x - scroll.x,
            self.rect.y - scroll.y,
            self.rect.width,
            self.rect.height,
        ))
    }
}

enum EffectHandle {
    Spring(SpringHandle),
    Offset(OffsetHandle),
    Reveal(TransitionHandle),
    Counter(CounterHandle),
    Loop(LoopHandle),
}

/// Per-frame output of one effect
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectValue {
    Spring { value: f64 },
    Offset { x: f64, y: f64 },
    Reveal { phase: RevealPhase, pose: Pose },
    Counter { displayed: u64 },
    Loop { value: f64 },
}

impl EffectHandle {
    fn sample(&self) -> EffectValue {
        match self {
            EffectHandle::Spring(h) => EffectValue::Spring { value: h.value() },
            EffectHandle::Offset(h) => {
                let offset = h.offset();
                EffectValue::Offset {
                    x: offset.x,
                    y: offset.y,
                }
            }
            EffectHandle::Reveal(h) => EffectValue::Reveal {
                phase: h.phase(),
                pose: h.pose(),
            },
            EffectHandle::Counter(h) => EffectValue::Counter {
                displayed: h.displayed(),
            },
            EffectHandle::Loop(h) => EffectValue::Loop { value: h.value() },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EffectSample<'a> {
    pub name: &'a str,
    #[serde(flatten)]
    pub value: EffectValue,
}

#[derive(Debug, Serialize)]
pub struct FrameReport<'a> {
    pub frame: u64,
    pub time: f64,
    pub pointer: Point,
    pub effects: Vec<EffectSample<'a>>,
}

pub struct Simulation<'s> {
    scene: &'s Scene,
    engine: MotionEngine,
    effects: Vec<(&'s str, EffectHandle)>,
    scroll: Rc<Cell<Point>>,
    next_scroll: usize,
}

impl<'s> Simulation<'s> {
    pub fn new(scene: &'s Scene) -> Result<Self> {
        let engine =
            MotionEngine::new(scene.engine_config()).context("Failed to create motion engine")?;
        let scroll = Rc::new(Cell::new(Point::default()));

        let mut effects = Vec::with_capacity(scene.effects.len());
        for spec in &scene.effects {
            let element = spec.rect.map(|rect| ScrolledRect {
                rect,
                scroll: scroll.clone(),
            });
            let handle = build(&engine, &spec.motion, element, spec.to)
                .with_context(|| format!("Failed to create effect `{}`", spec.name))?;
            tracing::debug!("Scene: created `{}`", spec.name);
            effects.push((spec.name.as_str(), handle));
        }

        Ok(Self {
            scene,
            engine,
            effects,
            scroll,
            next_scroll: 0,
        })
    }

    /// Step through the scene at `fps`, handing each frame to `sink`
    pub fn run<F>(&mut self, fps: f64, mut sink: F) -> Result<()>
    where
        F: FnMut(&FrameReport<'_>) -> Result<()>,
    {
        if !(fps > 0.0) || !fps.is_finite() {
            anyhow::bail!("fps must be a positive number");
        }
        let dt = 1.0 / fps;
        let frames = (self.scene.duration * fps).round() as u64;
        tracing::info!(
            "Simulating {} effects for {}s ({} frames at {} fps)",
            self.effects.len(),
            self.scene.duration,
            frames,
            fps
        );

        let mut last_pointer = None;
        for _ in 0..frames {
            let time = (self.engine.frame() + 1) as f64 * dt;

            if let Some(pointer) = pointer_at(&self.scene.pointer, time) {
                if last_pointer != Some(pointer) {
                    self.engine.pointer_move(pointer.x, pointer.y);
                    last_pointer = Some(pointer);
                }
            }
            self.apply_scroll(time);
            self.engine.tick(dt);

            let report = FrameReport {
                frame: self.engine.frame(),
                time,
                pointer: self.engine.pointer().point(),
                effects: self
                    .effects
                    .iter()
                    .map(|(name, handle)| EffectSample {
                        name: *name,
                        value: handle.sample(),
                    })
                    .collect(),
            };
            sink(&report)?;
        }
        Ok(())
    }

    fn apply_scroll(&mut self, time: f64) {
        let scene = self.scene;
        while let Some(event) = scene.scroll.get(self.next_scroll) {
            if event.at > time {
                break;
            }
            self.scroll.set(Point::new(event.x, event.y));
            let fired = self.engine.scroll();
            tracing::debug!(
                "Scene: scrolled to ({}, {}) at {:.3}s, {} triggered",
                event.x,
                event.y,
                time,
                fired
            );
            self.next_scroll += 1;
        }
    }
}

fn build(
    engine: &MotionEngine,
    motion: &MotionConfig,
    element: Option<ScrolledRect>,
    to: Option<f64>,
) -> MotionResult<EffectHandle> {
    let boxed = |element: Option<ScrolledRect>| {
        element.map(|e| Box::new(e) as Box<dyn ElementGeometry>)
    };
    Ok(match motion {
        MotionConfig::Spring(config) => {
            let handle = engine.create_spring(*config, 0.0)?;
            if let Some(target) = to {
                handle.set_target(target)?;
            }
            EffectHandle::Spring(handle)
        }
        MotionConfig::Magnetic(config) => {
            let element = element.ok_or_else(|| {
                MotionError::invalid("rect", "magnetic effects need an element")
            })?;
            EffectHandle::Offset(engine.create_magnetic(*config, element)?)
        }
        MotionConfig::Parallax(config) => {
            EffectHandle::Offset(engine.create_parallax(*config, boxed(element))?)
        }
        MotionConfig::Reveal(config) => {
            EffectHandle::Reveal(engine.create_reveal(*config, boxed(element))?)
        }
        MotionConfig::Counter(config) => {
            EffectHandle::Counter(engine.create_counter(*config, boxed(element))?)
        }
        MotionConfig::Loop(config) => EffectHandle::Loop(engine.create_loop(config.clone())?),
    })
}

/// Pointer position on the scripted path at `time`. None before the first
/// waypoint.
fn pointer_at(path: &[PointerWaypoint], time: f64) -> Option<Point> {
    let first = path.first()?;
    if time < first.at {
        return None;
    }
    let next = path.iter().position(|w| w.at > time);
    let Some(next) = next else {
        let last = path.last()?;
        return Some(Point::new(last.x, last.y));
    };
    let (a, b) = (&path[next - 1], &path[next]);
    let t = (time - a.at) / (b.at - a.at);
    Some(Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waypoint(at: f64, x: f64, y: f64) -> PointerWaypoint {
        PointerWaypoint { at, x, y }
    }

    #[test]
    fn test_pointer_path_interpolates() {
        let path = [waypoint(1.0, 0.0, 0.0), waypoint(2.0, 100.0, 50.0)];
        assert_eq!(pointer_at(&path, 0.5), None);
        assert_eq!(pointer_at(&path, 1.0), Some(Point::new(0.0, 0.0)));
        assert_eq!(pointer_at(&path, 1.5), Some(Point::new(50.0, 25.0)));
        assert_eq!(pointer_at(&path, 9.0), Some(Point::new(100.0, 50.0)));
        assert_eq!(pointer_at(&[], 1.0), None);
    }

    #[test]
    fn test_scroll_brings_reveal_into_view() {
        let scene = Scene::parse(
            r#"
            duration = 2.0

            [viewport]
            width = 1000
            height = 800

            [[effect]]
            name = "hero"
            kind = "reveal"
            duration = 0.5
            rect = { x = 0, y = 1200, width = 400, height = 200 }

            [[scroll]]
            at = 0.5
            y = 600
            "#,
        )
        .unwrap();

        let mut simulation = Simulation::new(&scene).unwrap();
        let mut phases = Vec::new();
        simulation
            .run(60.0, |report| {
                if let EffectValue::Reveal { phase, .. } = report.effects[0].value {
                    phases.push((report.time, phase));
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(phases.len(), 120);
        assert!(phases
            .iter()
            .filter(|(t, _)| *t < 0.5)
            .all(|(_, p)| *p == RevealPhase::Hidden));
        assert_eq!(phases.last().map(|(_, p)| *p), Some(RevealPhase::Visible));
    }

    #[test]
    fn test_magnetic_follows_scripted_pointer() {
        let scene = Scene::parse(
            r#"
            duration = 1.0

            [[effect]]
            name = "cta"
            kind = "magnetic"
            strength = 0.5
            rect = { x = 100, y = 100, width = 200, height = 100 }

            [[pointer]]
            at = 0.0
            x = 280
            y = 110
            "#,
        )
        .unwrap();

        let mut simulation = Simulation::new(&scene).unwrap();
        let mut last = EffectValue::Offset { x: 0.0, y: 0.0 };
        simulation
            .run(60.0, |report| {
                last = report.effects[0].value;
                Ok(())
            })
            .unwrap();

        let EffectValue::Offset { x, y } = last else {
            panic!("expected offset, got {last:?}");
        };
        assert!((x - 40.0).abs() < 0.5, "x = {x}");
        assert!((y + 20.0).abs() < 0.5, "y = {y}");
    }

    #[test]
    fn test_rejects_bad_fps() {
        let scene = Scene::parse("duration = 1.0").unwrap();
        let mut simulation = Simulation::new(&scene).unwrap();
        assert!(simulation.run(0.0, |_| Ok(())).is_err());
    }
}
