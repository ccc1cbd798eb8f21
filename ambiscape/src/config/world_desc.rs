use super::{AmbienceDesc, OcclusionDesc, ReverbDesc, TimeOfDayDesc};
use crate::error::Result;

/// Configuration descriptor for an Ambiscape context
#[derive(Debug, Clone, Default)]
pub struct AmbiscapeDesc {
    pub reverb: ReverbDesc,
    pub occlusion: OcclusionDesc,
    pub time_of_day: TimeOfDayDesc,
    pub ambience: AmbienceDesc,
}

impl AmbiscapeDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reverb(mut self, reverb: ReverbDesc) -> Self {
        self.reverb = reverb;
        self
    }

    pub fn occlusion(mut self, occlusion: OcclusionDesc) -> Self {
        self.occlusion = occlusion;
        self
    }

    pub fn time_of_day(mut self, time_of_day: TimeOfDayDesc) -> Self {
        self.time_of_day = time_of_day;
        self
    }

    pub fn ambience(mut self, ambience: AmbienceDesc) -> Self {
        self.ambience = ambience;
        self
    }

    /// Validates every component descriptor.
    pub fn validate(&self) -> Result<()> {
        self.reverb.validate()?;
        self.occlusion.validate()?;
        self.time_of_day.validate()?;
        self.ambience.validate()
    }
}
