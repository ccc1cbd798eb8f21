use super::{ensure, ensure_unit};
use crate::crossfade::FadeShape;
use crate::error::Result;

/// Configuration for the day/night ambience crossfader
#[derive(Debug, Clone)]
pub struct AmbienceDesc {
    pub day_track: String,
    pub night_track: String,
    /// Seconds to crossfade after a phase change
    pub crossfade_duration: f32,
    pub fade_shape: FadeShape,
    /// Gain of a fully faded-in track
    pub master_gain: f32,
}

impl Default for AmbienceDesc {
    fn default() -> Self {
        Self {
            day_track: "ambience_day".to_string(),
            night_track: "ambience_night".to_string(),
            crossfade_duration: 4.0,
            fade_shape: FadeShape::Linear,
            master_gain: 1.0,
        }
    }
}

impl AmbienceDesc {
    pub fn validate(&self) -> Result<()> {
        ensure(!self.day_track.is_empty() && !self.night_track.is_empty(), || {
            "ambience track names must not be empty".into()
        })?;
        ensure(self.day_track != self.night_track, || {
            "day_track and night_track must differ".into()
        })?;
        ensure(
            self.crossfade_duration.is_finite() && self.crossfade_duration >= 0.0,
            || "crossfade_duration must be >= 0".into(),
        )?;
        ensure_unit("master_gain", self.master_gain)
    }
}
