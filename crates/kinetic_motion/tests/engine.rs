//! End-to-end engine behavior: host input in, per-frame values out

use std::cell::Cell;
use std::rc::Rc;

use kinetic_animation::{LoopPreset, SpringConfig};
use kinetic_core::geometry::{Point, Rect, Size};
use kinetic_motion::{
    CounterConfig, Direction, EngineConfig, LoopConfig, MagneticConfig, MotionEngine,
    ParallaxConfig, Pose, RevealConfig, RevealPhase,
};

const DT: f64 = 1.0 / 60.0;

fn engine() -> MotionEngine {
    MotionEngine::new(EngineConfig {
        viewport: Size::new(1000.0, 800.0),
        intersection_observer: true,
    })
    .unwrap()
}

fn run(engine: &MotionEngine, frames: usize) {
    for _ in 0..frames {
        engine.tick(DT);
    }
}

/// Element whose rectangle the test moves around to simulate scrolling
fn element(rect: Rect) -> Rc<Cell<Option<Rect>>> {
    Rc::new(Cell::new(Some(rect)))
}

#[test]
fn pointer_drives_magnetic_offset_through_spring() {
    let engine = engine();
    let config = MagneticConfig {
        strength: 0.5,
        ..Default::default()
    };
    let button = engine
        .create_magnetic(config, Rect::new(100.0, 100.0, 200.0, 100.0))
        .unwrap();

    engine.pointer_move(280.0, 110.0);
    assert_eq!(button.target(), Point::new(40.0, -20.0));
    assert_eq!(button.offset(), Point::new(0.0, 0.0));

    run(&engine, 1);
    let first = button.offset();
    assert!(first.x > 0.0 && first.x < 40.0);

    run(&engine, 300);
    assert!(button.is_settled());
    assert_eq!(button.offset(), Point::new(40.0, -20.0));

    engine.pointer_move(900.0, 700.0);
    assert_eq!(button.target(), Point::new(0.0, 0.0));
    run(&engine, 600);
    assert_eq!(button.offset(), Point::new(0.0, 0.0));
}

#[test]
fn magnetic_center_has_no_pull() {
    let engine = engine();
    let button = engine
        .create_magnetic(MagneticConfig::default(), Rect::new(100.0, 100.0, 200.0, 100.0))
        .unwrap();
    engine.pointer_move(200.0, 150.0);
    run(&engine, 60);
    assert_eq!(button.target(), Point::new(0.0, 0.0));
    assert_eq!(button.offset(), Point::new(0.0, 0.0));
}

#[test]
fn deeper_parallax_layers_move_further() {
    let engine = engine();
    let near = engine
        .create_parallax(ParallaxConfig::layer(1.0), None)
        .unwrap();
    let far = engine
        .create_parallax(ParallaxConfig::layer(2.0), None)
        .unwrap();

    engine.pointer_move(800.0, 200.0);
    run(&engine, 300);

    let ratio = far.offset().x / near.offset().x;
    assert!((ratio - 2.0).abs() < 1e-3, "ratio = {ratio}");
    assert!(far.offset().y < near.offset().y);
}

#[test]
fn local_parallax_recenters_when_pointer_leaves() {
    let engine = engine();
    let card = engine
        .create_parallax(
            ParallaxConfig::local(1.0),
            Some(Box::new(Rect::new(200.0, 200.0, 100.0, 100.0))),
        )
        .unwrap();

    engine.pointer_move(300.0, 250.0);
    run(&engine, 120);
    assert!(card.offset().x > 19.0);

    engine.pointer_move(10.0, 10.0);
    run(&engine, 600);
    assert_eq!(card.offset(), Point::new(0.0, 0.0));
}

#[test]
fn reveal_triggers_once_on_scroll() {
    let engine = engine();
    let slot = element(Rect::new(0.0, 1200.0, 200.0, 200.0));
    let reveal = engine
        .create_reveal(
            RevealConfig {
                direction: Direction::Right,
                ..Default::default()
            },
            Some(Box::new(slot.clone())),
        )
        .unwrap();

    run(&engine, 30);
    assert_eq!(reveal.phase(), RevealPhase::Hidden);
    assert_eq!(reveal.pose(), Pose::hidden(Direction::Right));
    assert_eq!(engine.active_frame_count(), 0);

    slot.set(Some(Rect::new(0.0, 500.0, 200.0, 200.0)));
    assert_eq!(engine.scroll(), 1);
    assert_eq!(reveal.phase(), RevealPhase::Revealing);
    assert_eq!(reveal.pose(), Pose::hidden(Direction::Right));

    run(&engine, 60);
    assert_eq!(reveal.phase(), RevealPhase::Visible);
    assert_eq!(reveal.pose(), Pose::IDENTITY);

    // Scrolling away and back never re-hides or re-fires
    slot.set(Some(Rect::new(0.0, 3000.0, 200.0, 200.0)));
    assert_eq!(engine.scroll(), 0);
    slot.set(Some(Rect::new(0.0, 500.0, 200.0, 200.0)));
    assert_eq!(engine.scroll(), 0);
    run(&engine, 10);
    assert_eq!(reveal.pose(), Pose::IDENTITY);
}

#[test]
fn reveal_below_threshold_waits() {
    let engine = engine();
    // 20 of 200px visible = 0.1, under the 0.3 default
    let slot = element(Rect::new(0.0, 780.0, 200.0, 200.0));
    let reveal = engine
        .create_reveal(RevealConfig::default(), Some(Box::new(slot.clone())))
        .unwrap();
    run(&engine, 10);
    assert_eq!(reveal.phase(), RevealPhase::Hidden);

    slot.set(Some(Rect::new(0.0, 700.0, 200.0, 200.0)));
    run(&engine, 1);
    assert_eq!(reveal.phase(), RevealPhase::Revealing);
}

#[test]
fn resize_can_bring_element_into_view() {
    let engine = engine();
    let reveal = engine
        .create_reveal(
            RevealConfig::default(),
            Some(Box::new(Rect::new(0.0, 900.0, 100.0, 100.0))),
        )
        .unwrap();
    assert_eq!(reveal.phase(), RevealPhase::Hidden);

    assert_eq!(engine.resize(Size::new(1000.0, 1200.0)).unwrap(), 1);
    assert_eq!(reveal.phase(), RevealPhase::Revealing);
}

#[test]
fn host_pushed_intersections_fire_once() {
    let engine = engine();
    let reveal = engine.create_reveal(RevealConfig::default(), None).unwrap();
    let region = reveal.region().unwrap();

    assert!(!engine.notify_intersection(region, 0.1));
    assert_eq!(reveal.phase(), RevealPhase::Hidden);

    assert!(engine.notify_intersection(region, 0.5));
    assert!(!engine.notify_intersection(region, 0.9));
    assert!(!engine.notify_intersection(region, 0.0));
    assert_eq!(reveal.phase(), RevealPhase::Revealing);
}

#[test]
fn counter_counts_up_on_first_view() {
    let engine = engine();
    let slot = element(Rect::new(0.0, 1000.0, 100.0, 50.0));
    let counter = engine
        .create_counter(
            CounterConfig {
                target: 50,
                duration: 2.5,
                ..Default::default()
            },
            Some(Box::new(slot.clone())),
        )
        .unwrap();

    run(&engine, 30);
    assert!(!counter.is_started());
    assert_eq!(counter.displayed(), 0);

    slot.set(Some(Rect::new(0.0, 100.0, 100.0, 50.0)));
    engine.scroll();
    assert!(counter.is_started());

    let mut last = 0;
    for _ in 0..200 {
        engine.tick(DT);
        assert!(counter.displayed() >= last);
        last = counter.displayed();
    }
    assert!(counter.is_finished());
    assert_eq!(counter.displayed(), 50);
    assert_eq!(engine.active_frame_count(), 0);
}

#[test]
fn loops_stagger_and_run_until_disposed() {
    let engine = engine();
    let bob = LoopPreset::Bob { amplitude: 8.0 };
    let a = engine
        .create_loop(LoopConfig::preset(bob).with_period(2.0))
        .unwrap();
    let b = engine
        .create_loop(LoopConfig::preset(bob).with_period(2.0).with_delay(0.5))
        .unwrap();

    run(&engine, 20);
    assert_ne!(a.value(), b.value());

    run(&engine, 600);
    assert!(a.cycle() >= 5);
    assert_eq!(engine.active_frame_count(), 2);
}

#[test]
fn dispose_stops_further_mutation() {
    let engine = engine();
    let offset = engine
        .create_parallax(ParallaxConfig::layer(1.0), None)
        .unwrap();
    let counter = engine
        .create_counter(
            CounterConfig {
                target: 1000,
                duration: 2.0,
                ..Default::default()
            },
            Some(Box::new(Rect::new(0.0, 0.0, 100.0, 100.0))),
        )
        .unwrap();
    let looped = engine
        .create_loop(LoopConfig::preset(LoopPreset::Spin))
        .unwrap();
    let spring = engine
        .create_spring(Default::default(), 0.0)
        .unwrap();

    engine.pointer_move(1000.0, 0.0);
    spring.set_target(100.0).unwrap();
    run(&engine, 20);

    offset.dispose();
    counter.dispose();
    looped.dispose();
    spring.dispose();

    let frozen = (offset.offset(), counter.displayed(), looped.value(), spring.value());
    engine.pointer_move(0.0, 800.0);
    spring.set_target(-50.0).unwrap();
    run(&engine, 120);

    assert_eq!(
        (offset.offset(), counter.displayed(), looped.value(), spring.value()),
        frozen
    );
    assert!(!counter.is_finished());
}

#[test]
fn no_registrations_outlive_handles() {
    let engine = engine();
    let slot = element(Rect::new(0.0, 5000.0, 10.0, 10.0));

    let handles = (
        engine
            .create_magnetic(MagneticConfig::default(), Rect::new(0.0, 0.0, 50.0, 50.0))
            .unwrap(),
        engine
            .create_parallax(ParallaxConfig::layer(1.0), None)
            .unwrap(),
        engine
            .create_reveal(RevealConfig::default(), Some(Box::new(slot.clone())))
            .unwrap(),
        engine
            .create_counter(CounterConfig::default(), Some(Box::new(slot.clone())))
            .unwrap(),
        engine
            .create_loop(LoopConfig::preset(LoopPreset::Spin))
            .unwrap(),
    );
    assert_eq!(engine.subscriber_count(), 2);
    assert_eq!(engine.active_frame_count(), 3);
    assert_eq!(engine.watching_count(), 2);

    handles.0.dispose();
    handles.2.dispose();
    handles.2.dispose();
    assert_eq!(engine.subscriber_count(), 1);
    assert_eq!(engine.watching_count(), 1);

    drop(handles);
    assert_eq!(engine.subscriber_count(), 0);
    assert_eq!(engine.active_frame_count(), 0);
    assert_eq!(engine.region_count(), 0);
}

#[test]
fn detached_element_is_ignored() {
    let engine = engine();
    let slot = element(Rect::new(100.0, 100.0, 200.0, 100.0));
    let button = engine
        .create_magnetic(
            MagneticConfig {
                strength: 0.5,
                ..Default::default()
            },
            slot.clone(),
        )
        .unwrap();
    engine.pointer_move(280.0, 110.0);
    let target = button.target();

    slot.set(None);
    engine.pointer_move(120.0, 190.0);
    run(&engine, 5);
    assert_eq!(button.target(), target);
}

#[test]
fn missing_observer_starts_immediately() {
    let engine = MotionEngine::new(EngineConfig {
        viewport: Size::new(1000.0, 800.0),
        intersection_observer: false,
    })
    .unwrap();

    let reveal = engine
        .create_reveal(
            RevealConfig::default(),
            Some(Box::new(Rect::new(0.0, 5000.0, 10.0, 10.0))),
        )
        .unwrap();
    let counter = engine
        .create_counter(
            CounterConfig {
                target: 10,
                ..Default::default()
            },
            None,
        )
        .unwrap();

    assert_eq!(reveal.phase(), RevealPhase::Revealing);
    assert!(reveal.region().is_none());
    assert!(counter.is_started());

    run(&engine, 300);
    assert_eq!(reveal.phase(), RevealPhase::Visible);
    assert_eq!(counter.displayed(), 10);
}

#[test]
fn handles_survive_engine_drop() {
    let engine = engine();
    let spring = engine.create_spring(Default::default(), 3.0).unwrap();
    let offset = engine
        .create_parallax(ParallaxConfig::layer(1.0), None)
        .unwrap();
    drop(engine);

    assert_eq!(spring.value(), 3.0);
    assert_eq!(offset.offset(), Point::new(0.0, 0.0));
    spring.dispose();
    offset.dispose();
    assert!(spring.is_disposed());
}

#[test]
fn invalid_configs_fail_fast() {
    let engine = engine();
    assert!(engine
        .create_magnetic(
            MagneticConfig {
                strength: f64::NAN,
                ..Default::default()
            },
            Rect::new(0.0, 0.0, 10.0, 10.0),
        )
        .is_err());
    assert!(engine
        .create_reveal(
            RevealConfig {
                duration: -1.0,
                ..Default::default()
            },
            None,
        )
        .is_err());
    assert!(engine
        .create_loop(LoopConfig::preset(LoopPreset::Spin).with_period(0.0))
        .is_err());

    let stiff = SpringConfig::new(1e8, 0.0, 1e-3);
    assert!(engine.create_spring(stiff, 0.0).is_err());
    assert!(engine
        .create_magnetic(
            MagneticConfig {
                spring: SpringConfig::new(100.0, 1e6, 1e-3),
                ..Default::default()
            },
            Rect::new(0.0, 0.0, 10.0, 10.0),
        )
        .is_err());
    assert_eq!(engine.subscriber_count(), 0);
    assert_eq!(engine.active_frame_count(), 0);
    assert_eq!(engine.region_count(), 0);
}
