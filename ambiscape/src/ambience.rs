//! Day and night ambience beds.
//!
//! The mixer follows the time-of-day phase: a completed transition starts a
//! crossfade toward the new phase's track, a forced phase snaps the gains.

use crate::backend::{AudioBackend, ParameterWriter};
use crate::config::AmbienceDesc;
use crate::crossfade::Crossfade;
use crate::time_of_day::{Phase, TimeOfDayEvent};

/// Gains of the two ambience tracks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbienceGains {
    pub day: f32,
    pub night: f32,
}

impl AmbienceGains {
    fn settled(phase: Phase, master_gain: f32) -> Self {
        match phase {
            Phase::Day => Self {
                day: master_gain,
                night: 0.0,
            },
            Phase::Night => Self {
                day: 0.0,
                night: master_gain,
            },
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveFade {
    fade: Crossfade,
    from: AmbienceGains,
    to: AmbienceGains,
}

/// Crossfades the day and night tracks on phase changes.
#[derive(Debug, Clone)]
pub struct AmbienceMixer {
    desc: AmbienceDesc,
    phase: Phase,
    gains: AmbienceGains,
    active: Option<ActiveFade>,
}

impl AmbienceMixer {
    pub fn new(desc: AmbienceDesc, initial_phase: Phase) -> Self {
        let gains = AmbienceGains::settled(initial_phase, desc.master_gain);
        Self {
            desc,
            phase: initial_phase,
            gains,
            active: None,
        }
    }

    /// Reacts to a time-of-day event. Only `PhaseChanged` matters.
    pub fn handle_event(&mut self, event: &TimeOfDayEvent) {
        if let TimeOfDayEvent::PhaseChanged { phase } = event {
            self.crossfade_to(*phase);
        }
    }

    /// Starts a crossfade from the current gains toward `phase`.
    ///
    /// A fade already running is replaced, starting from wherever it got to.
    pub fn crossfade_to(&mut self, phase: Phase) {
        if phase == self.phase && self.active.is_none() {
            return;
        }
        self.phase = phase;
        log::info!(
            "Ambience crossfade to {} over {:.1}s",
            phase,
            self.desc.crossfade_duration
        );
        self.active = Some(ActiveFade {
            fade: Crossfade::new(self.desc.crossfade_duration, self.desc.fade_shape),
            from: self.gains,
            to: AmbienceGains::settled(phase, self.desc.master_gain),
        });
    }

    /// Jumps straight to `phase`'s gains, cancelling any fade.
    pub fn snap_to(&mut self, phase: Phase) {
        self.phase = phase;
        self.active = None;
        self.gains = AmbienceGains::settled(phase, self.desc.master_gain);
    }

    /// Advances the fade and writes both track gains.
    pub fn tick(
        &mut self,
        delta_time: f32,
        backend: &mut dyn AudioBackend,
        writer: &mut ParameterWriter,
    ) -> AmbienceGains {
        if let Some(active) = &mut self.active {
            let weights = active.fade.tick(delta_time);
            self.gains = AmbienceGains {
                day: active.from.day * weights.source + active.to.day * weights.target,
                night: active.from.night * weights.source + active.to.night * weights.target,
            };
            if active.fade.is_finished() {
                self.gains = active.to;
                self.active = None;
            }
        }

        writer.write_track(backend, &self.desc.day_track, self.gains.day);
        writer.write_track(backend, &self.desc.night_track, self.gains.night);
        self.gains
    }

    pub fn gains(&self) -> AmbienceGains {
        self.gains
    }

    /// Phase the mixer is settled on or fading toward
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_fading(&self) -> bool {
        self.active.is_some()
    }

    pub fn desc(&self) -> &AmbienceDesc {
        &self.desc
    }
}
