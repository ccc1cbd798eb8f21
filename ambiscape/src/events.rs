//! Event types for Ambiscape

use crate::occlusion::EmitterId;
use crate::time_of_day::{Phase, TimeOfDayEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum AmbiscapeEvent {
    TransitionStarted {
        target: Phase,
    },
    TimeOfDayChanged {
        value: f32,
    },
    PhaseChanged {
        phase: Phase,
    },
    RoomSizeChanged {
        old_size: f32,
        new_size: f32,
    },
    EmitterRegistered {
        emitter_id: EmitterId,
    },
    EmitterUnregistered {
        emitter_id: EmitterId,
    },
    EmitterPruned {
        emitter_id: EmitterId,
    },
    ContextShutdown,
}

impl AmbiscapeEvent {
    pub fn emitter_id(&self) -> Option<EmitterId> {
        match self {
            Self::EmitterRegistered { emitter_id }
            | Self::EmitterUnregistered { emitter_id }
            | Self::EmitterPruned { emitter_id } => Some(*emitter_id),
            _ => None,
        }
    }

    pub fn is_time_of_day_event(&self) -> bool {
        matches!(
            self,
            Self::TransitionStarted { .. }
                | Self::TimeOfDayChanged { .. }
                | Self::PhaseChanged { .. }
        )
    }

    pub fn is_emitter_event(&self) -> bool {
        self.emitter_id().is_some()
    }
}

impl From<TimeOfDayEvent> for AmbiscapeEvent {
    fn from(event: TimeOfDayEvent) -> Self {
        match event {
            TimeOfDayEvent::TransitionStarted { target } => Self::TransitionStarted { target },
            TimeOfDayEvent::ParameterChanged { value } => Self::TimeOfDayChanged { value },
            TimeOfDayEvent::PhaseChanged { phase } => Self::PhaseChanged { phase },
        }
    }
}
