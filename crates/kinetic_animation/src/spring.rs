//! Damped spring simulation
//!
//! A spring pulls one scalar toward a target. [`SpringState`] holds the
//! physical state and [`advance`] integrates it with semi-implicit Euler:
//!
//! ```text
//! a  = (stiffness * (target - position) - damping * velocity) / mass
//! v += a * dt
//! x += v * dt
//! ```
//!
//! Large frame deltas are split into sub-steps sized from the spring's own
//! time constants, which keeps stiff, light springs stable at 60Hz.

use kinetic_core::error::{
    ensure_finite, ensure_non_negative, ensure_positive, MotionError, Result,
};
use serde::{Deserialize, Serialize};

/// Longest single frame delta honoured by [`advance`] (seconds)
pub const MAX_FRAME_DT: f64 = 0.1;

/// Upper bound on integration sub-steps per [`advance`] call
pub const MAX_SUBSTEPS: usize = 2048;

/// Displacement below which a slow spring snaps to its target
pub const REST_DELTA: f64 = 0.001;

/// Speed below which a near-target spring snaps to its target
pub const REST_SPEED: f64 = 0.001;

/// Spring feel: stiffness (pull), damping (resistance), mass (inertia)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl SpringConfig {
    pub const fn new(stiffness: f64, damping: f64, mass: f64) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Elastic follow used by magnetic elements
    pub const fn magnetic() -> Self {
        Self::new(150.0, 15.0, 0.1)
    }

    /// Stiffer and lighter than [`SpringConfig::magnetic`] so parallax feels immediate
    pub const fn parallax() -> Self {
        Self::new(400.0, 20.0, 0.05)
    }

    /// Slow, soft settle
    pub const fn gentle() -> Self {
        Self::new(100.0, 20.0, 1.0)
    }

    /// Fast settle with little overshoot
    pub const fn snappy() -> Self {
        Self::new(400.0, 30.0, 1.0)
    }

    /// Check every parameter is finite and physically meaningful, and that
    /// [`advance`] can integrate the spring stably within [`MAX_SUBSTEPS`].
    pub fn validate(&self) -> Result<()> {
        ensure_positive("stiffness", self.stiffness)?;
        ensure_non_negative("damping", self.damping)?;
        ensure_positive("mass", self.mass)?;

        let steps = (MAX_FRAME_DT / self.max_substep()).ceil();
        if !(steps <= MAX_SUBSTEPS as f64) {
            let decay_limited = self.damping > 0.0
                && self.mass / self.damping < (self.mass / self.stiffness).sqrt();
            let param = if decay_limited { "damping" } else { "stiffness" };
            return Err(MotionError::invalid(
                param,
                format!(
                    "needs {steps} integration steps per frame, limit is {MAX_SUBSTEPS}; \
                     raise mass or lower {param}"
                ),
            ));
        }
        Ok(())
    }

    /// Largest stable integration step for this spring
    fn max_substep(&self) -> f64 {
        let oscillation = (self.mass / self.stiffness).sqrt();
        let decay = if self.damping > 0.0 {
            self.mass / self.damping
        } else {
            f64::INFINITY
        };
        0.5 * oscillation.min(decay)
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::new(100.0, 10.0, 1.0)
    }
}

/// Physical state of one spring-driven scalar
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringState {
    pub position: f64,
    pub velocity: f64,
    pub target: f64,
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl SpringState {
    /// Create a spring at rest at `initial`
    pub fn new(config: SpringConfig, initial: f64) -> Result<Self> {
        config.validate()?;
        ensure_finite("initial", initial)?;
        Ok(Self {
            position: initial,
            velocity: 0.0,
            target: initial,
            stiffness: config.stiffness,
            damping: config.damping,
            mass: config.mass,
        })
    }

    pub fn config(&self) -> SpringConfig {
        SpringConfig::new(self.stiffness, self.damping, self.mass)
    }

    /// Retarget without touching velocity. Takes effect on the next [`advance`].
    pub fn set_target(&mut self, target: f64) -> Result<()> {
        ensure_finite("target", target)?;
        self.target = target;
        Ok(())
    }

    /// Teleport to `value` and come to rest there
    pub fn jump_to(&mut self, value: f64) -> Result<()> {
        ensure_finite("value", value)?;
        self.position = value;
        self.target = value;
        self.velocity = 0.0;
        Ok(())
    }

    pub fn is_settled(&self) -> bool {
        (self.target - self.position).abs() < REST_DELTA && self.velocity.abs() < REST_SPEED
    }

    /// Advance by `dt` seconds, see [`advance`]
    pub fn step(&mut self, dt: f64) -> f64 {
        advance(self, dt)
    }
}

/// Integrate `state` forward by `dt` seconds and return the new position.
///
/// `dt <= 0` (or NaN) leaves the state untouched. `dt` above
/// [`MAX_FRAME_DT`] is clamped so a stalled frame cannot fling the value.
pub fn advance(state: &mut SpringState, dt: f64) -> f64 {
    if !(dt > 0.0) {
        return state.position;
    }
    if state.position == state.target && state.velocity == 0.0 {
        return state.position;
    }

    let dt = dt.min(MAX_FRAME_DT);
    let max_step = state.config().max_substep();
    let steps = ((dt / max_step).ceil() as usize).clamp(1, MAX_SUBSTEPS);
    let h = dt / steps as f64;

    for _ in 0..steps {
        let spring_force = state.stiffness * (state.target - state.position);
        let damping_force = state.damping * state.velocity;
        let acceleration = (spring_force - damping_force) / state.mass;
        state.velocity += acceleration * h;
        state.position += state.velocity * h;
    }

    if state.is_settled() {
        state.position = state.target;
        state.velocity = 0.0;
    }

    state.position
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    fn settle(state: &mut SpringState, max_steps: usize) -> Option<usize> {
        (0..max_steps).find(|_| {
            advance(state, DT);
            (state.position - state.target).abs() < 1e-3 && state.velocity.abs() < 1e-3
        })
    }

    #[test]
    fn test_converges_across_observed_range() {
        for stiffness in [100.0, 150.0, 250.0, 400.0] {
            for damping in [15.0, 30.0, 50.0] {
                for mass in [0.1, 0.5, 1.0] {
                    let config = SpringConfig::new(stiffness, damping, mass);
                    let mut spring = SpringState::new(config, 0.0).unwrap();
                    spring.set_target(100.0).unwrap();
                    assert!(
                        settle(&mut spring, 3000).is_some(),
                        "{config:?} did not converge"
                    );
                }
            }
        }
    }

    #[test]
    fn test_oscillation_stays_bounded() {
        let mut spring = SpringState::new(SpringConfig::new(400.0, 15.0, 0.1), 0.0).unwrap();
        spring.set_target(10.0).unwrap();
        for _ in 0..600 {
            let x = advance(&mut spring, DT);
            assert!(x.is_finite());
            assert!(x.abs() < 30.0, "position blew up: {x}");
        }
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut spring = SpringState::new(SpringConfig::magnetic(), 0.0).unwrap();
        spring.set_target(50.0).unwrap();
        advance(&mut spring, DT);
        let before = spring;
        advance(&mut spring, 0.0);
        assert_eq!(spring, before);
    }

    #[test]
    fn test_negative_and_nan_dt_ignored() {
        let mut spring = SpringState::new(SpringConfig::magnetic(), 0.0).unwrap();
        spring.set_target(50.0).unwrap();
        advance(&mut spring, DT);
        let before = spring;
        advance(&mut spring, -1.0);
        advance(&mut spring, f64::NAN);
        assert_eq!(spring, before);
    }

    #[test]
    fn test_retarget_keeps_velocity() {
        let mut spring = SpringState::new(SpringConfig::magnetic(), 0.0).unwrap();
        spring.set_target(100.0).unwrap();
        advance(&mut spring, DT);
        let velocity = spring.velocity;
        let position = spring.position;
        assert!(velocity > 0.0);

        spring.set_target(-100.0).unwrap();
        assert_eq!(spring.velocity, velocity);
        assert_eq!(spring.position, position);
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(SpringState::new(SpringConfig::new(0.0, 10.0, 1.0), 0.0).is_err());
        assert!(SpringState::new(SpringConfig::new(100.0, -1.0, 1.0), 0.0).is_err());
        assert!(SpringState::new(SpringConfig::new(100.0, 10.0, f64::NAN), 0.0).is_err());
        assert!(SpringState::new(SpringConfig::default(), f64::INFINITY).is_err());

        let mut spring = SpringState::new(SpringConfig::default(), 0.0).unwrap();
        assert!(spring.set_target(f64::NAN).is_err());
        assert_eq!(spring.target, 0.0);
    }

    #[test]
    fn test_rejects_springs_too_stiff_to_integrate() {
        for (config, param) in [
            (SpringConfig::new(1e8, 0.0, 1e-3), "stiffness"),
            (SpringConfig::new(100.0, 1e6, 1e-3), "damping"),
        ] {
            match config.validate() {
                Err(MotionError::InvalidConfig { param: p, .. }) => assert_eq!(p, param),
                other => panic!("{config:?} accepted: {other:?}"),
            }
            assert!(SpringState::new(config, 0.0).is_err());
        }

        for preset in [
            SpringConfig::default(),
            SpringConfig::magnetic(),
            SpringConfig::parallax(),
            SpringConfig::gentle(),
            SpringConfig::snappy(),
        ] {
            assert!(preset.validate().is_ok(), "{preset:?}");
        }
    }

    #[test]
    fn test_stiffest_accepted_spring_stays_finite() {
        let config = SpringConfig::new(1e5, 0.0, 1e-3);
        assert!(config.validate().is_ok());

        let mut spring = SpringState::new(config, 0.0).unwrap();
        spring.set_target(10.0).unwrap();
        for _ in 0..120 {
            let x = advance(&mut spring, DT);
            assert!(x.is_finite() && x.abs() < 25.0, "position = {x}");
        }
    }

    #[test]
    fn test_settles_exactly_on_target() {
        let mut spring = SpringState::new(SpringConfig::snappy(), 0.0).unwrap();
        spring.set_target(1.0).unwrap();
        for _ in 0..600 {
            advance(&mut spring, DT);
        }
        assert!(spring.is_settled());
        assert_eq!(spring.position, 1.0);
        assert_eq!(spring.velocity, 0.0);
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let mut a = SpringState::new(SpringConfig::gentle(), 0.0).unwrap();
        let mut b = a;
        a.set_target(10.0).unwrap();
        b.set_target(10.0).unwrap();
        advance(&mut a, 5.0);
        advance(&mut b, MAX_FRAME_DT);
        assert_eq!(a.position, b.position);
    }
}
