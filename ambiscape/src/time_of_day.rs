//! Day/night parameter clock.
//!
//! A normalized clock advances at `1 / day_duration_seconds` per second and
//! wraps at 1. Crossing the day-start or night-start boundary starts a
//! transition that ramps a single parameter between the two phase values.
//! The phase itself only flips when that ramp completes, so
//! [`TimeOfDayEvent::PhaseChanged`] always means "transition finished".
//!
//! # Example
//!
//! ```
//! use ambiscape::backend::{MemoryBackend, ParameterWriter};
//! use ambiscape::config::TimeOfDayDesc;
//! use ambiscape::time_of_day::{Phase, TimeOfDayController, TimeOfDayEvent};
//!
//! let desc = TimeOfDayDesc {
//!     start_clock: 0.2,
//!     transition_duration: 1.0,
//!     ..Default::default()
//! };
//! let mut clock = TimeOfDayController::new(desc);
//! let events = clock.subscribe();
//! let mut backend = MemoryBackend::new();
//! let mut writer = ParameterWriter::new();
//!
//! clock.set_clock(0.25);
//! for _ in 0..11 {
//!     clock.tick(0.1, &mut backend, &mut writer);
//! }
//! assert_eq!(clock.current_phase(), Phase::Day);
//! assert!(events.try_iter().any(|e| e == TimeOfDayEvent::PhaseChanged { phase: Phase::Day }));
//! ```

use crate::backend::{AudioBackend, ParameterWriter};
use crate::config::TimeOfDayDesc;
use crate::math::{clamp01, lerp};
use crossbeam_channel::{Receiver, Sender, unbounded};

/// Discrete time-of-day state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Day,
    Night,
}

impl Phase {
    pub fn opposite(self) -> Self {
        match self {
            Self::Day => Self::Night,
            Self::Night => Self::Day,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Day => "Day",
            Self::Night => "Night",
        })
    }
}

/// How a forced phase is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMode {
    /// Set phase and parameter at once, firing both notifications
    Immediate,
    /// Ramp from the current parameter value like a clock-driven transition
    Transition,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeOfDayEvent {
    TransitionStarted { target: Phase },
    ParameterChanged { value: f32 },
    PhaseChanged { phase: Phase },
}

/// Snapshot of the controller's state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeOfDayState {
    /// Clock in `[0, 1)`
    pub normalized_clock: f32,
    /// Only updated when a transition completes
    pub current_phase: Phase,
    pub target_phase: Phase,
    pub is_transitioning: bool,
    /// Controller time (seconds) at which the running transition began
    pub transition_start: f64,
    pub transition_start_value: f32,
    pub transition_target_value: f32,
    pub current_parameter_value: f32,
}

/// The single authoritative day/night clock of a context.
pub struct TimeOfDayController {
    desc: TimeOfDayDesc,
    state: TimeOfDayState,
    // Seconds of unpaused ticking, the time base for transitions.
    elapsed: f64,
    // Phase implied by the clock at the previous tick; a change is a crossing.
    clock_phase: Phase,
    // Crossing seen while a transition was running.
    pending: Option<Phase>,
    paused: bool,
    time_scale: f32,
    subscribers: Vec<Sender<TimeOfDayEvent>>,
}

impl TimeOfDayController {
    pub fn new(desc: TimeOfDayDesc) -> Self {
        let clock = desc.start_clock.rem_euclid(1.0);
        let phase = phase_at(&desc, clock);
        let value = value_for(&desc, phase);
        let time_scale = desc.time_scale;
        Self {
            state: TimeOfDayState {
                normalized_clock: clock,
                current_phase: phase,
                target_phase: phase,
                is_transitioning: false,
                transition_start: 0.0,
                transition_start_value: value,
                transition_target_value: value,
                current_parameter_value: value,
            },
            desc,
            elapsed: 0.0,
            clock_phase: phase,
            pending: None,
            paused: false,
            time_scale,
            subscribers: Vec::new(),
        }
    }

    /// New receiver for every event fired from now on.
    pub fn subscribe(&mut self) -> Receiver<TimeOfDayEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    /// Advances the clock and any running transition, then writes the parameter.
    pub fn tick(
        &mut self,
        delta_time: f32,
        backend: &mut dyn AudioBackend,
        writer: &mut ParameterWriter,
    ) {
        if !self.paused {
            let dt = delta_time.max(0.0);
            self.elapsed += dt as f64;
            let advance = dt * self.time_scale / self.desc.day_duration_seconds;
            self.state.normalized_clock = (self.state.normalized_clock + advance).rem_euclid(1.0);
        }

        let clock_phase = self.phase_at(self.state.normalized_clock);
        if clock_phase != self.clock_phase {
            self.clock_phase = clock_phase;
            if self.state.is_transitioning {
                log::debug!(
                    "Clock crossed into {} during a transition to {}, deferring",
                    clock_phase,
                    self.state.target_phase
                );
                self.pending = Some(clock_phase);
            } else if clock_phase != self.state.current_phase {
                self.start_transition(clock_phase);
            }
        }

        if self.state.is_transitioning {
            self.advance_transition();
        }

        writer.write_global(
            backend,
            &self.desc.parameter_name,
            self.state.current_parameter_value,
        );
    }

    fn start_transition(&mut self, target: Phase) {
        self.state.target_phase = target;
        self.state.is_transitioning = true;
        self.state.transition_start = self.elapsed;
        self.state.transition_start_value = self.state.current_parameter_value;
        self.state.transition_target_value = value_for(&self.desc, target);
        log::info!(
            "Time of day transition to {} started at clock {}",
            target,
            self.clock_time_string()
        );
        self.broadcast(TimeOfDayEvent::TransitionStarted { target });
    }

    fn advance_transition(&mut self) {
        let progress = self.transition_progress();
        let value = lerp(
            self.state.transition_start_value,
            self.state.transition_target_value,
            self.desc.curve.evaluate(progress),
        );
        self.state.current_parameter_value = value;
        self.broadcast(TimeOfDayEvent::ParameterChanged { value });

        if progress >= 1.0 {
            self.state.current_phase = self.state.target_phase;
            self.state.is_transitioning = false;
            log::info!("Phase changed to {}", self.state.current_phase);
            self.broadcast(TimeOfDayEvent::PhaseChanged {
                phase: self.state.current_phase,
            });

            if let Some(next) = self.pending.take() {
                if next != self.state.current_phase {
                    self.start_transition(next);
                }
            }
        }
    }

    /// Forces a phase, bypassing the clock.
    ///
    /// `Immediate` cancels any transition, sets phase and parameter at once,
    /// writes the backend and fires `ParameterChanged` then `PhaseChanged`.
    /// `Transition` restarts a ramp toward `phase` from the current value.
    pub fn force_phase(
        &mut self,
        phase: Phase,
        mode: ForceMode,
        backend: &mut dyn AudioBackend,
        writer: &mut ParameterWriter,
    ) {
        self.pending = None;
        match mode {
            ForceMode::Immediate => {
                let value = value_for(&self.desc, phase);
                self.state.is_transitioning = false;
                self.state.current_phase = phase;
                self.state.target_phase = phase;
                self.state.transition_start_value = value;
                self.state.transition_target_value = value;
                self.state.current_parameter_value = value;
                writer.write_global(backend, &self.desc.parameter_name, value);
                log::info!("Phase forced to {}", phase);
                self.broadcast(TimeOfDayEvent::ParameterChanged { value });
                self.broadcast(TimeOfDayEvent::PhaseChanged { phase });
            }
            ForceMode::Transition => {
                if !self.state.is_transitioning && self.state.current_phase == phase {
                    return;
                }
                self.start_transition(phase);
            }
        }
    }

    /// Moves the clock. Boundary crossings are evaluated on the next tick.
    pub fn set_clock(&mut self, normalized: f32) {
        self.state.normalized_clock = normalized.rem_euclid(1.0);
    }

    /// Freezes the clock and any running transition.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale.max(0.0);
    }

    fn broadcast(&mut self, event: TimeOfDayEvent) {
        self.subscribers.retain(|sender| sender.send(event).is_ok());
    }

    /// Phase implied by a clock value.
    pub fn phase_at(&self, clock: f32) -> Phase {
        phase_at(&self.desc, clock)
    }

    /// Fraction of the running transition completed; 1 when idle.
    pub fn transition_progress(&self) -> f32 {
        if !self.state.is_transitioning || self.desc.transition_duration <= 0.0 {
            return 1.0;
        }
        let t = (self.elapsed - self.state.transition_start) / self.desc.transition_duration as f64;
        clamp01(t as f32)
    }

    /// Clock on a 24-hour dial, `"HH:MM"`.
    pub fn clock_time_string(&self) -> String {
        let minutes = (self.state.normalized_clock * 24.0 * 60.0).floor() as u32 % (24 * 60);
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }

    pub fn normalized_clock(&self) -> f32 {
        self.state.normalized_clock
    }

    pub fn current_phase(&self) -> Phase {
        self.state.current_phase
    }

    pub fn target_phase(&self) -> Phase {
        self.state.target_phase
    }

    pub fn parameter_value(&self) -> f32 {
        self.state.current_parameter_value
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.is_transitioning
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn state(&self) -> &TimeOfDayState {
        &self.state
    }

    pub fn desc(&self) -> &TimeOfDayDesc {
        &self.desc
    }
}

fn phase_at(desc: &TimeOfDayDesc, clock: f32) -> Phase {
    let in_day = if desc.day_start < desc.night_start {
        clock >= desc.day_start && clock < desc.night_start
    } else {
        clock >= desc.day_start || clock < desc.night_start
    };
    if in_day { Phase::Day } else { Phase::Night }
}

fn value_for(desc: &TimeOfDayDesc, phase: Phase) -> f32 {
    match phase {
        Phase::Day => desc.day_value,
        Phase::Night => desc.night_value,
    }
}
