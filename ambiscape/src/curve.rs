//! Response curves mapping a normalized input to a parameter domain.
//!
//! Curves are monotonic by convention only: a keyframed curve may go up and
//! down, and the engine evaluates it as given.

use crate::error::{AmbiscapeError, Result};
use crate::math::{clamp01, lerp};

/// A shape applied to a normalized `[0, 1]` value before it reaches the backend.
///
/// # Example
///
/// ```
/// use ambiscape::curve::ResponseCurve;
///
/// let curve = ResponseCurve::keyframes(vec![(0.0, 0.0), (0.5, 0.8), (1.0, 1.0)])?;
/// assert!((curve.evaluate(0.25) - 0.4).abs() < 1e-6);
/// # Ok::<(), ambiscape::AmbiscapeError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseCurve {
    /// Identity mapping
    #[default]
    Linear,
    /// Hermite smooth-step `3t² - 2t³`
    SmoothStep,
    /// Quadratic ease-in `t²`
    EaseIn,
    /// Quadratic ease-out `1 - (1 - t)²`
    EaseOut,
    /// Piecewise-linear curve through sorted `(time, value)` keys
    Keyframes(Vec<(f32, f32)>),
}

impl ResponseCurve {
    /// Builds a keyframed curve, sorting keys by time.
    ///
    /// # Errors
    ///
    /// Returns an error if no keys are given or any key is not finite.
    pub fn keyframes(mut keys: Vec<(f32, f32)>) -> Result<Self> {
        if keys.is_empty() {
            return Err(AmbiscapeError::Curve(
                "A keyframed curve needs at least one key".into(),
            ));
        }
        if keys.iter().any(|(t, v)| !t.is_finite() || !v.is_finite()) {
            return Err(AmbiscapeError::Curve("Curve keys must be finite".into()));
        }
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self::Keyframes(keys))
    }

    /// Evaluates the curve at `t`, clamping `t` into `[0, 1]` first.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = clamp01(t);
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::Keyframes(keys) => evaluate_keys(keys, t),
        }
    }
}

fn evaluate_keys(keys: &[(f32, f32)], t: f32) -> f32 {
    let Some(&(first_t, first_v)) = keys.first() else {
        return t;
    };
    if t <= first_t {
        return first_v;
    }
    for window in keys.windows(2) {
        let (t0, v0) = window[0];
        let (t1, v1) = window[1];
        if t <= t1 {
            if (t1 - t0).abs() <= f32::EPSILON {
                return v1;
            }
            return lerp(v0, v1, (t - t0) / (t1 - t0));
        }
    }
    keys.last().map(|&(_, v)| v).unwrap_or(t)
}
