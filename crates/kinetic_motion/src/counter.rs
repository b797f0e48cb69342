//! Count-up animation
//!
//! Runs once from 0 to an integer target on an ease-out-quartic curve:
//!
//! ```text
//! displayed = floor((1 - (1 - progress)^4) * target)
//! ```
//!
//! The curve is monotonic, so the displayed value never goes down and the
//! final frame lands exactly on `target`.

use kinetic_animation::Easing;
use kinetic_core::error::Result;

use crate::config::CounterConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
enum CounterState {
    Idle,
    Waiting { remaining: f64 },
    Counting { elapsed: f64 },
    Finished,
}

pub struct CounterAnimation {
    config: CounterConfig,
    state: CounterState,
    displayed: u64,
}

impl CounterAnimation {
    pub fn new(config: CounterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: CounterState::Idle,
            displayed: 0,
        })
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    /// Value to show this frame
    pub fn displayed(&self) -> u64 {
        self.displayed
    }

    pub fn progress(&self) -> f64 {
        match self.state {
            CounterState::Idle | CounterState::Waiting { .. } => 0.0,
            CounterState::Counting { elapsed } => (elapsed / self.config.duration).clamp(0.0, 1.0),
            CounterState::Finished => 1.0,
        }
    }

    pub fn is_started(&self) -> bool {
        self.state != CounterState::Idle
    }

    pub fn is_finished(&self) -> bool {
        self.state == CounterState::Finished
    }

    /// Begin counting. Later calls are ignored.
    pub fn start(&mut self) {
        if self.state != CounterState::Idle {
            return;
        }
        tracing::debug!(
            "Counter: counting to {} over {}s",
            self.config.target,
            self.config.duration
        );
        self.state = if self.config.delay > 0.0 {
            CounterState::Waiting {
                remaining: self.config.delay,
            }
        } else {
            CounterState::Counting { elapsed: 0.0 }
        };
        self.update();
    }

    /// Advance by `dt` seconds. Returns true while still counting.
    pub fn tick(&mut self, dt: f64) -> bool {
        if dt > 0.0 {
            match self.state {
                CounterState::Idle | CounterState::Finished => {}
                CounterState::Waiting { remaining } => {
                    let remaining = remaining - dt;
                    self.state = if remaining > 0.0 {
                        CounterState::Waiting { remaining }
                    } else {
                        CounterState::Counting {
                            elapsed: -remaining,
                        }
                    };
                }
                CounterState::Counting { elapsed } => {
                    self.state = CounterState::Counting {
                        elapsed: elapsed + dt,
                    };
                }
            }
            self.update();
        }
        matches!(
            self.state,
            CounterState::Waiting { .. } | CounterState::Counting { .. }
        )
    }

    /// Displayed value for `target` at linear `progress`
    pub fn value_at(target: u64, progress: f64) -> u64 {
        if progress >= 1.0 {
            return target;
        }
        let eased = Easing::EaseOutQuart.apply(progress);
        ((eased * target as f64).floor() as u64).min(target)
    }

    fn update(&mut self) {
        if let CounterState::Counting { elapsed } = self.state {
            if elapsed >= self.config.duration {
                tracing::debug!("Counter: reached {}", self.config.target);
                self.state = CounterState::Finished;
            }
        }
        self.displayed = Self::value_at(self.config.target, self.progress());
    }
}
