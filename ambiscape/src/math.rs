//! Math types and scalar helpers for Ambiscape

pub use glam::Vec3;

/// Clamps `value` into `[0, 1]`.
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Unclamped linear interpolation between `a` and `b`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `value` between `a` and `b`, clamped to `[0, 1]`.
///
/// Returns 0 when `a == b`.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    clamp01((value - a) / (b - a))
}

/// Interpolation factor for a frame-rate independent exponential approach.
///
/// `rate` is in 1/seconds. The result is in `[0, 1]` and can be fed to [`lerp`].
pub fn exp_smoothing_factor(rate: f32, delta_time: f32) -> f32 {
    if rate <= 0.0 || delta_time <= 0.0 {
        return 0.0;
    }
    1.0 - (-rate * delta_time).exp()
}
