//! Motion error types

use thiserror::Error;

/// Errors produced by motion primitives
///
/// None of these are fatal to the host. Construction errors are surfaced so
/// the caller can fail fast; runtime errors degrade the effect to a static pose.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// A numeric parameter was non-finite or outside its accepted range
    #[error("Invalid config for `{param}`: {reason}")]
    InvalidConfig {
        param: &'static str,
        reason: String,
    },

    /// A geometry query hit an element that is no longer attached
    #[error("Element is detached from the document")]
    DetachedElement,

    /// The host cannot observe viewport intersections
    #[error("Intersection observation is unavailable on this host")]
    ObserverUnavailable,
}

impl MotionError {
    /// Shorthand for an [`MotionError::InvalidConfig`]
    pub fn invalid(param: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            param,
            reason: reason.into(),
        }
    }
}

/// Result type for motion operations
pub type Result<T> = std::result::Result<T, MotionError>;

/// Reject NaN and infinities
pub fn ensure_finite(param: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MotionError::invalid(param, format!("must be finite, got {value}")))
    }
}

/// Require a finite value strictly greater than zero
pub fn ensure_positive(param: &'static str, value: f64) -> Result<()> {
    ensure_finite(param, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(MotionError::invalid(param, format!("must be > 0, got {value}")))
    }
}

/// Require a finite value greater than or equal to zero
pub fn ensure_non_negative(param: &'static str, value: f64) -> Result<()> {
    ensure_finite(param, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(MotionError::invalid(param, format!("must be >= 0, got {value}")))
    }
}

/// Require a finite value within `[min, max]`
pub fn ensure_in_range(param: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    ensure_finite(param, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(MotionError::invalid(
            param,
            format!("must be within [{min}, {max}], got {value}"),
        ))
    }
}
