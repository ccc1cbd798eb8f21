use super::{ensure, ensure_positive, ensure_unit};
use crate::curve::ResponseCurve;
use crate::error::Result;
use crate::scene::LayerMask;

/// Configuration for the line-of-sight occlusion estimator
#[derive(Debug, Clone)]
pub struct OcclusionDesc {
    /// Occlusion recomputations per second, independent of frame rate
    pub tick_rate: f32,
    /// Emitters farther than this from the listener get zero occlusion
    pub max_occlusion_distance: f32,
    /// Per-second rate at which applied occlusion approaches its target
    pub smoothing_speed: f32,
    pub layer_mask: LayerMask,
    /// Effects for emitters registered without their own
    pub default_effects: OcclusionEffects,
}

impl Default for OcclusionDesc {
    fn default() -> Self {
        Self {
            tick_rate: 10.0,
            max_occlusion_distance: 50.0,
            smoothing_speed: 8.0,
            layer_mask: LayerMask::ALL,
            default_effects: OcclusionEffects::default(),
        }
    }
}

impl OcclusionDesc {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("tick_rate", self.tick_rate)?;
        ensure_positive("max_occlusion_distance", self.max_occlusion_distance)?;
        ensure_positive("smoothing_speed", self.smoothing_speed)?;
        self.default_effects.validate()
    }
}

/// How one emitter turns its occlusion value into backend writes.
///
/// Each effect is optional. Parameters the emitter's instance does not expose
/// are detected once at registration time and skipped afterwards.
#[derive(Debug, Clone)]
pub struct OcclusionEffects {
    /// Emitter parameter receiving the raw occlusion value
    pub parameter_name: Option<String>,
    pub volume_enabled: bool,
    /// Volume multiplier at full occlusion
    pub min_volume_when_occluded: f32,
    pub lowpass_enabled: bool,
    pub lowpass_parameter: String,
    /// Cutoff (Hz) with a clear line of sight
    pub open_cutoff: f32,
    /// Cutoff (Hz) at full occlusion
    pub closed_cutoff: f32,
    /// Fraction of the open→closed cutoff range reachable
    pub max_lowpass_amount: f32,
    pub curve: ResponseCurve,
}

impl Default for OcclusionEffects {
    fn default() -> Self {
        Self {
            parameter_name: Some("Occlusion".to_string()),
            volume_enabled: true,
            min_volume_when_occluded: 0.3,
            lowpass_enabled: true,
            lowpass_parameter: "LowpassCutoff".to_string(),
            open_cutoff: 22_000.0,
            closed_cutoff: 800.0,
            max_lowpass_amount: 1.0,
            curve: ResponseCurve::Linear,
        }
    }
}

impl OcclusionEffects {
    /// Only the raw occlusion parameter, no volume or filter changes.
    pub fn parameter_only(name: impl Into<String>) -> Self {
        Self {
            parameter_name: Some(name.into()),
            volume_enabled: false,
            lowpass_enabled: false,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_unit("min_volume_when_occluded", self.min_volume_when_occluded)?;
        ensure_unit("max_lowpass_amount", self.max_lowpass_amount)?;
        ensure_positive("open_cutoff", self.open_cutoff)?;
        ensure_positive("closed_cutoff", self.closed_cutoff)?;
        ensure(
            !self.lowpass_enabled || !self.lowpass_parameter.is_empty(),
            || "lowpass_parameter must not be empty when the low-pass is enabled".into(),
        )
    }
}
