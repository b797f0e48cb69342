//! Keyframe tracks
//!
//! A track maps a normalized cycle position (0.0 to 1.0) to a value by easing
//! between neighbouring keyframes. Loop animations sample one track per cycle.

use crate::easing::Easing;
use kinetic_core::error::{ensure_finite, ensure_in_range, MotionError, Result};
use serde::{Deserialize, Serialize};

/// A single keyframe
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Time position (0.0 to 1.0)
    pub time: f64,
    /// Value at this keyframe
    pub value: f64,
    /// Easing used when transitioning TO this keyframe
    #[serde(default)]
    pub easing: Easing,
}

impl Keyframe {
    pub const fn new(time: f64, value: f64, easing: Easing) -> Self {
        Self {
            time,
            value,
            easing,
        }
    }
}

/// How a looping track replays each cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// Restart from the first keyframe every cycle
    #[default]
    Loop,
    /// Alternate forward and backward cycles (ping-pong)
    Mirror,
}

/// Sorted, validated keyframes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct KeyframeTrack {
    keyframes: Vec<Keyframe>,
}

impl KeyframeTrack {
    /// Build a track, sorting by time. Fails on an empty list or bad values.
    pub fn new(mut keyframes: Vec<Keyframe>) -> Result<Self> {
        if keyframes.is_empty() {
            return Err(MotionError::invalid("keyframes", "must not be empty"));
        }
        for kf in &keyframes {
            ensure_in_range("keyframe.time", kf.time, 0.0, 1.0)?;
            ensure_finite("keyframe.value", kf.value)?;
        }
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(Self { keyframes })
    }

    pub fn builder() -> KeyframeTrackBuilder {
        KeyframeTrackBuilder::new()
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Value at the start of the track
    pub fn first_value(&self) -> f64 {
        self.keyframes.first().map_or(0.0, |kf| kf.value)
    }

    /// Sample the track at `progress` (clamped to 0.0..=1.0)
    pub fn sample(&self, progress: f64) -> f64 {
        let (Some(first), Some(last)) = (self.keyframes.first(), self.keyframes.last()) else {
            return 0.0;
        };
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };

        // Find surrounding keyframes
        let mut prev_kf = first;
        let mut next_kf = last;
        for kf in &self.keyframes {
            if kf.time <= progress {
                prev_kf = kf;
            }
            if kf.time >= progress {
                next_kf = kf;
                break;
            }
        }

        // Outside the keyframed span the nearest keyframe holds
        if (next_kf.time - prev_kf.time).abs() < f64::EPSILON {
            return prev_kf.value;
        }

        let local_progress = (progress - prev_kf.time) / (next_kf.time - prev_kf.time);
        let eased = next_kf.easing.apply(local_progress);
        prev_kf.value + (next_kf.value - prev_kf.value) * eased
    }
}

impl TryFrom<Vec<Keyframe>> for KeyframeTrack {
    type Error = MotionError;

    fn try_from(keyframes: Vec<Keyframe>) -> Result<Self> {
        Self::new(keyframes)
    }
}

impl From<KeyframeTrack> for Vec<Keyframe> {
    fn from(track: KeyframeTrack) -> Self {
        track.keyframes
    }
}

/// Fluent builder for [`KeyframeTrack`]
///
/// ```rust
/// use kinetic_animation::{Easing, KeyframeTrack};
///
/// let track = KeyframeTrack::builder()
///     .at(0.0, 0.0)
///     .at(0.5, -10.0)
///     .at(1.0, 0.0)
///     .ease(Easing::EaseInOut)
///     .build()
///     .unwrap();
/// assert_eq!(track.sample(0.5), -10.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct KeyframeTrackBuilder {
    points: Vec<Keyframe>,
    default_easing: Easing,
}

impl KeyframeTrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keyframe at a cycle position (0.0 to 1.0)
    pub fn at(mut self, time: f64, value: f64) -> Self {
        self.points
            .push(Keyframe::new(time, value, self.default_easing));
        self
    }

    /// Add a keyframe with specific easing
    pub fn at_with_ease(mut self, time: f64, value: f64, easing: Easing) -> Self {
        self.points.push(Keyframe::new(time, value, easing));
        self
    }

    /// Set the easing for all keyframes added so far and after
    pub fn ease(mut self, easing: Easing) -> Self {
        self.default_easing = easing;
        for point in &mut self.points {
            point.easing = easing;
        }
        self
    }

    pub fn build(self) -> Result<KeyframeTrack> {
        KeyframeTrack::new(self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> KeyframeTrack {
        KeyframeTrack::builder()
            .at(0.0, 0.0)
            .at(0.5, -20.0)
            .at(1.0, 0.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_sample_interpolates_linearly() {
        let track = bob();
        assert_eq!(track.sample(0.0), 0.0);
        assert_eq!(track.sample(0.25), -10.0);
        assert_eq!(track.sample(0.5), -20.0);
        assert_eq!(track.sample(1.0), 0.0);
    }

    #[test]
    fn test_sample_clamps() {
        let track = bob();
        assert_eq!(track.sample(-3.0), 0.0);
        assert_eq!(track.sample(7.0), 0.0);
        assert_eq!(track.sample(f64::NAN), 0.0);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let track = KeyframeTrack::new(vec![
            Keyframe::new(1.0, 360.0, Easing::Linear),
            Keyframe::new(0.0, 0.0, Easing::Linear),
        ])
        .unwrap();
        assert_eq!(track.sample(0.5), 180.0);
    }

    #[test]
    fn test_partial_track_holds_last_value() {
        let track = KeyframeTrack::builder().at(0.0, 1.0).at(0.5, 2.0).build().unwrap();
        assert_eq!(track.sample(0.75), 2.0);
    }

    #[test]
    fn test_rejects_bad_keyframes() {
        assert!(KeyframeTrack::new(Vec::new()).is_err());
        assert!(KeyframeTrack::builder().at(1.5, 0.0).build().is_err());
        assert!(KeyframeTrack::builder().at(0.0, f64::NAN).build().is_err());
    }
}
