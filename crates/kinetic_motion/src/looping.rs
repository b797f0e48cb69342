//! Infinite keyframe loops
//!
//! A loop samples its keyframe track once per frame at
//! `((t - delay) mod period) / period`. [`RepeatMode::Mirror`] plays every
//! odd cycle backwards. Loops never finish on their own.

use kinetic_animation::{KeyframeTrack, RepeatMode};
use kinetic_core::error::Result;

use crate::config::LoopConfig;

pub struct LoopAnimation {
    config: LoopConfig,
    track: KeyframeTrack,
    elapsed: f64,
    value: f64,
}

impl LoopAnimation {
    pub fn new(config: LoopConfig) -> Result<Self> {
        config.validate()?;
        let track = config.shape.track()?;
        Ok(Self {
            value: track.first_value(),
            track,
            config,
            elapsed: 0.0,
        })
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn track(&self) -> &KeyframeTrack {
        &self.track
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Completed cycles, zero while still inside the initial delay
    pub fn cycle(&self) -> u64 {
        self.position().map_or(0, |(cycle, _)| cycle)
    }

    /// Position inside the current cycle in `[0, 1)`, after mirroring
    pub fn phase(&self) -> f64 {
        self.position().map_or(0.0, |(_, phase)| phase)
    }

    pub fn tick(&mut self, dt: f64) {
        if !(dt > 0.0) {
            return;
        }
        self.elapsed += dt;
        self.value = match self.position() {
            Some((_, phase)) => self.track.sample(phase),
            None => self.track.first_value(),
        };
    }

    fn position(&self) -> Option<(u64, f64)> {
        let t = self.elapsed - self.config.delay;
        if t < 0.0 {
            return None;
        }
        let period = self.config.period;
        let cycle = (t / period).floor();
        let phase = (t - cycle * period) / period;
        let cycle = cycle as u64;
        let phase = match self.config.repeat {
            RepeatMode::Mirror if cycle % 2 == 1 => 1.0 - phase,
            _ => phase,
        };
        Some((cycle, phase.clamp(0.0, 1.0)))
    }
}
