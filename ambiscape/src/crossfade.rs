//! Two-track gain crossfade sampled once per tick.

use crate::math::clamp01;

/// Shape of the gain ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeShape {
    #[default]
    Linear,
    SmoothStep,
}

impl FadeShape {
    fn apply(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Gains for the outgoing (`source`) and incoming (`target`) tracks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeGains {
    pub source: f32,
    pub target: f32,
}

impl CrossfadeGains {
    pub const START: Self = Self {
        source: 1.0,
        target: 0.0,
    };

    pub const END: Self = Self {
        source: 0.0,
        target: 1.0,
    };
}

/// Ramps one gain 1→0 while the other goes 0→1 over `duration` seconds.
///
/// The tick that reaches or passes `duration` returns [`CrossfadeGains::END`]
/// exactly, whatever the accumulated frame times were.
#[derive(Debug, Clone)]
pub struct Crossfade {
    duration: f32,
    elapsed: f32,
    shape: FadeShape,
    finished: bool,
}

impl Crossfade {
    pub fn new(duration: f32, shape: FadeShape) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            shape,
            finished: false,
        }
    }

    /// Gains at the current position without advancing.
    pub fn gains(&self) -> CrossfadeGains {
        if self.finished {
            return CrossfadeGains::END;
        }
        if self.elapsed <= 0.0 {
            return CrossfadeGains::START;
        }
        let t = self.shape.apply(clamp01(self.elapsed / self.duration));
        CrossfadeGains {
            source: 1.0 - t,
            target: t,
        }
    }

    /// Advances by `delta_time` and returns the gains to apply this tick.
    pub fn tick(&mut self, delta_time: f32) -> CrossfadeGains {
        if self.finished {
            return CrossfadeGains::END;
        }
        self.elapsed += delta_time.max(0.0);
        if self.elapsed >= self.duration {
            self.finished = true;
        }
        self.gains()
    }

    /// Fraction of the fade completed, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.finished {
            1.0
        } else if self.duration <= 0.0 {
            0.0
        } else {
            clamp01(self.elapsed / self.duration)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}
