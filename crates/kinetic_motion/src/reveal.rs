//! Reveal transition
//!
//! A one-shot entrance: the element sits at an off-screen [`Pose`] until it
//! is first seen, then eases to the identity pose and stays there.
//!
//! ```text
//! Hidden --enter--> Revealing (delay, then duration) --> Visible (terminal)
//! ```

use kinetic_animation::Easing;
use kinetic_core::error::Result;
use serde::{Deserialize, Serialize};

use crate::config::{Direction, RevealConfig};

/// Distance in pixels a directional reveal travels
pub const REVEAL_DISTANCE: f64 = 50.0;

/// Starting scale of a scale reveal
pub const REVEAL_SCALE: f64 = 0.8;

/// Presentation parameters for the host renderer
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub opacity: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Pose {
    /// Fully visible, untransformed
    pub const IDENTITY: Pose = Pose {
        opacity: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    /// Off-screen starting pose for `direction`
    pub fn hidden(direction: Direction) -> Self {
        let hidden = Pose {
            opacity: 0.0,
            ..Self::IDENTITY
        };
        match direction {
            Direction::Up => Pose {
                translate_y: REVEAL_DISTANCE,
                ..hidden
            },
            Direction::Down => Pose {
                translate_y: -REVEAL_DISTANCE,
                ..hidden
            },
            Direction::Left => Pose {
                translate_x: REVEAL_DISTANCE,
                ..hidden
            },
            Direction::Right => Pose {
                translate_x: -REVEAL_DISTANCE,
                ..hidden
            },
            Direction::Scale => Pose {
                scale: REVEAL_SCALE,
                ..hidden
            },
        }
    }

    pub fn lerp(&self, to: &Pose, t: f64) -> Pose {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Pose {
            opacity: mix(self.opacity, to.opacity),
            translate_x: mix(self.translate_x, to.translate_x),
            translate_y: mix(self.translate_y, to.translate_y),
            scale: mix(self.scale, to.scale),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Observable lifecycle of a reveal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealPhase {
    Hidden,
    Revealing,
    Visible,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum RevealState {
    Hidden,
    /// Entered view, holding the hidden pose for the configured delay
    Waiting { remaining: f64 },
    Entering { elapsed: f64 },
    Visible,
}

pub struct RevealTransition {
    config: RevealConfig,
    state: RevealState,
    pose: Pose,
}

impl RevealTransition {
    pub fn new(config: RevealConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pose: Pose::hidden(config.direction),
            state: RevealState::Hidden,
            config,
        })
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    pub fn phase(&self) -> RevealPhase {
        match self.state {
            RevealState::Hidden => RevealPhase::Hidden,
            RevealState::Waiting { .. } | RevealState::Entering { .. } => RevealPhase::Revealing,
            RevealState::Visible => RevealPhase::Visible,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Linear progress through the duration, before easing
    pub fn progress(&self) -> f64 {
        match self.state {
            RevealState::Hidden | RevealState::Waiting { .. } => 0.0,
            RevealState::Entering { elapsed } => (elapsed / self.config.duration).clamp(0.0, 1.0),
            RevealState::Visible => 1.0,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            RevealState::Waiting { .. } | RevealState::Entering { .. }
        )
    }

    /// The element entered view. Only the first call has any effect.
    pub fn enter(&mut self) {
        if self.state != RevealState::Hidden {
            return;
        }
        tracing::debug!(
            "Reveal: entering {:?}, delay={}s duration={}s",
            self.config.direction,
            self.config.delay,
            self.config.duration
        );
        self.state = if self.config.delay > 0.0 {
            RevealState::Waiting {
                remaining: self.config.delay,
            }
        } else {
            RevealState::Entering { elapsed: 0.0 }
        };
        self.settle();
    }

    /// Advance by `dt` seconds. Returns true while still animating.
    pub fn tick(&mut self, dt: f64) -> bool {
        if !(dt > 0.0) {
            return self.is_active();
        }
        match self.state {
            RevealState::Hidden | RevealState::Visible => {}
            RevealState::Waiting { remaining } => {
                let remaining = remaining - dt;
                self.state = if remaining > 0.0 {
                    RevealState::Waiting { remaining }
                } else {
                    RevealState::Entering {
                        elapsed: -remaining,
                    }
                };
            }
            RevealState::Entering { elapsed } => {
                self.state = RevealState::Entering {
                    elapsed: elapsed + dt,
                };
            }
        }
        self.settle();
        self.is_active()
    }

    /// Pose at linear `progress` for a reveal from `direction`.
    ///
    /// `progress <= 0` is exactly the hidden pose and `progress >= 1` exactly
    /// the identity pose.
    pub fn sample(direction: Direction, easing: Easing, progress: f64) -> Pose {
        if !(progress > 0.0) {
            return Pose::hidden(direction);
        }
        if progress >= 1.0 {
            return Pose::IDENTITY;
        }
        Pose::hidden(direction).lerp(&Pose::IDENTITY, easing.apply(progress))
    }

    fn settle(&mut self) {
        if let RevealState::Entering { elapsed } = self.state {
            if elapsed >= self.config.duration {
                tracing::debug!("Reveal: {:?} visible", self.config.direction);
                self.state = RevealState::Visible;
            }
        }
        self.pose = Self::sample(self.config.direction, self.config.easing, self.progress());
    }
}
