//! Configuration descriptors.
//!
//! Every component is configured by a plain struct with public fields and a
//! `Default` impl, validated once when the [`AmbiscapeContext`](crate::AmbiscapeContext)
//! is built.

mod ambience_desc;
mod occlusion_desc;
mod reverb_desc;
mod time_of_day_desc;
mod world_desc;

pub use ambience_desc::AmbienceDesc;
pub use occlusion_desc::{OcclusionDesc, OcclusionEffects};
pub use reverb_desc::ReverbDesc;
pub use time_of_day_desc::TimeOfDayDesc;
pub use world_desc::AmbiscapeDesc;

use crate::error::{AmbiscapeError, Result};

pub(crate) fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(AmbiscapeError::Configuration(message()))
    }
}

pub(crate) fn ensure_positive(name: &str, value: f32) -> Result<()> {
    ensure(value.is_finite() && value > 0.0, || {
        format!("{} must be a finite value > 0 (got {})", name, value)
    })
}

pub(crate) fn ensure_unit(name: &str, value: f32) -> Result<()> {
    ensure((0.0..=1.0).contains(&value), || {
        format!("{} must be between 0.0 and 1.0 (got {})", name, value)
    })
}
