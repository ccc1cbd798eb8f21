use super::{ensure, ensure_positive, ensure_unit};
use crate::curve::ResponseCurve;
use crate::error::Result;

/// Configuration for the day/night parameter clock
#[derive(Debug, Clone)]
pub struct TimeOfDayDesc {
    /// Real seconds for one full clock cycle
    pub day_duration_seconds: f32,
    /// Normalized clock value at startup
    pub start_clock: f32,
    /// Clock value at which day begins
    pub day_start: f32,
    /// Clock value at which night begins
    pub night_start: f32,
    /// Seconds a transition takes; 0 switches instantly on the next tick
    pub transition_duration: f32,
    /// Parameter value held during the day
    pub day_value: f32,
    /// Parameter value held during the night
    pub night_value: f32,
    /// Shape of the transition ramp
    pub curve: ResponseCurve,
    /// Global parameter receiving the time-of-day value
    pub parameter_name: String,
    /// Clock speed multiplier
    pub time_scale: f32,
}

impl Default for TimeOfDayDesc {
    fn default() -> Self {
        Self {
            day_duration_seconds: 600.0,
            start_clock: 0.3,
            day_start: 0.25,
            night_start: 0.75,
            transition_duration: 5.0,
            day_value: 0.0,
            night_value: 1.0,
            curve: ResponseCurve::SmoothStep,
            parameter_name: "TimeOfDay".to_string(),
            time_scale: 1.0,
        }
    }
}

impl TimeOfDayDesc {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("day_duration_seconds", self.day_duration_seconds)?;
        for (name, value) in [
            ("start_clock", self.start_clock),
            ("day_start", self.day_start),
            ("night_start", self.night_start),
        ] {
            ensure((0.0..1.0).contains(&value), || {
                format!("{} must be in [0, 1) (got {})", name, value)
            })?;
        }
        ensure(self.day_start != self.night_start, || {
            "day_start and night_start must differ".into()
        })?;
        ensure(
            self.transition_duration.is_finite() && self.transition_duration >= 0.0,
            || "transition_duration must be >= 0".into(),
        )?;
        ensure_unit("day_value", self.day_value)?;
        ensure_unit("night_value", self.night_value)?;
        ensure(self.time_scale.is_finite() && self.time_scale >= 0.0, || {
            "time_scale must be >= 0".into()
        })?;
        ensure(!self.parameter_name.is_empty(), || {
            "parameter_name must not be empty".into()
        })
    }
}
