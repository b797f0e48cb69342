//! Loop presets for decorative ambient motion
//!
//! Pre-built keyframe tracks for the usual infinite loops: a vertical bob,
//! a rotating ring, a horizontal conveyor and a gentle pulse.

use crate::easing::Easing;
use crate::keyframe::KeyframeTrack;
use kinetic_core::error::Result;
use serde::{Deserialize, Serialize};

/// Pre-built loop shapes
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "preset", rename_all = "snake_case")]
pub enum LoopPreset {
    /// Float up by `amplitude` pixels and back down
    Bob { amplitude: f64 },
    /// Full rotation in degrees
    Spin,
    /// Scroll left by `distance` pixels, then jump back
    Marquee { distance: f64 },
    /// Scale up to `peak` and back to 1.0
    Pulse { peak: f64 },
}

impl LoopPreset {
    /// Keyframes for one cycle
    pub fn track(&self) -> Result<KeyframeTrack> {
        match *self {
            LoopPreset::Bob { amplitude } => KeyframeTrack::builder()
                .at(0.0, 0.0)
                .at(0.5, -amplitude)
                .at(1.0, 0.0)
                .ease(Easing::EaseInOut)
                .build(),
            LoopPreset::Spin => KeyframeTrack::builder().at(0.0, 0.0).at(1.0, 360.0).build(),
            LoopPreset::Marquee { distance } => KeyframeTrack::builder()
                .at(0.0, 0.0)
                .at(1.0, -distance)
                .build(),
            LoopPreset::Pulse { peak } => KeyframeTrack::builder()
                .at(0.0, 1.0)
                .at(0.5, peak)
                .at(1.0, 1.0)
                .ease(Easing::EaseInOut)
                .build(),
        }
    }
}
