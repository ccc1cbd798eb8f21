//! The process-wide owner of every Ambiscape service.

use crate::ambience::AmbienceMixer;
use crate::backend::{AudioBackend, ParameterWriter};
use crate::config::{AmbiscapeDesc, OcclusionEffects};
use crate::error::{AmbiscapeError, Result};
use crate::events::AmbiscapeEvent;
use crate::math::Vec3;
use crate::occlusion::{EmitterId, EmitterSource, OcclusionEstimator};
use crate::reverb::DynamicReverb;
use crate::scene::{MaterialTable, RayTracer};
use crate::time_of_day::{ForceMode, Phase, TimeOfDayController, TimeOfDayEvent};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::Arc;

/// Events kept for [`AmbiscapeContext::poll_events`] before the oldest are dropped
pub const EVENT_QUEUE_CAPACITY: usize = 1024;

/// Smallest change in normalized room size reported as an event
pub const ROOM_SIZE_EVENT_STEP: f32 = 0.01;

/// Owns one instance of each service and runs them once per frame.
///
/// The host constructs a context at startup, calls [`tick`](Self::tick) from
/// its frame loop with the elapsed time and listener pose, and calls
/// [`shutdown`](Self::shutdown) when the session ends.
///
/// # Frame order
///
/// 1. Time of day: clock, transitions, the time-of-day parameter
/// 2. Reverb: a batch of sweep rays, room estimate, the room-size parameter
/// 3. Occlusion: targets for every emitter, then smoothing and emitter writes
/// 4. Ambience: track gains
///
/// No step returns an error. Failed backend writes are logged once per key
/// and retried by the next frame.
pub struct AmbiscapeContext<B: AudioBackend> {
    desc: AmbiscapeDesc,
    tracer: Arc<dyn RayTracer>,
    materials: MaterialTable,
    backend: B,
    writer: ParameterWriter,
    time_of_day: TimeOfDayController,
    time_of_day_events: Receiver<TimeOfDayEvent>,
    reverb: DynamicReverb,
    occlusion: OcclusionEstimator,
    ambience: AmbienceMixer,
    listener: Vec3,
    reported_room_size: f32,
    event_sender: Sender<AmbiscapeEvent>,
    event_receiver: Receiver<AmbiscapeEvent>,
    frame: u64,
    shut_down: bool,
}

impl<B: AudioBackend> AmbiscapeContext<B> {
    /// Builds every service from `desc`.
    ///
    /// # Errors
    ///
    /// Returns [`AmbiscapeError::Configuration`] if any descriptor is invalid.
    pub fn new(
        desc: AmbiscapeDesc,
        tracer: Arc<dyn RayTracer>,
        materials: MaterialTable,
        backend: B,
    ) -> Result<Self> {
        desc.validate()?;

        let mut time_of_day = TimeOfDayController::new(desc.time_of_day.clone());
        let time_of_day_events = time_of_day.subscribe();
        let ambience = AmbienceMixer::new(desc.ambience.clone(), time_of_day.current_phase());
        let reverb = DynamicReverb::new(desc.reverb.clone());
        let reported_room_size = reverb.room_size();
        let occlusion = OcclusionEstimator::new(desc.occlusion.clone());
        let (event_sender, event_receiver) = bounded(EVENT_QUEUE_CAPACITY);

        log::info!(
            "Ambiscape context created: {} materials, clock {} ({})",
            materials.len(),
            time_of_day.clock_time_string(),
            time_of_day.current_phase()
        );

        Ok(Self {
            desc,
            tracer,
            materials,
            backend,
            writer: ParameterWriter::new(),
            time_of_day,
            time_of_day_events,
            reverb,
            occlusion,
            ambience,
            listener: Vec3::ZERO,
            reported_room_size,
            event_sender,
            event_receiver,
            frame: 0,
            shut_down: false,
        })
    }

    /// Runs one frame with the listener at `listener`. Does nothing after
    /// [`shutdown`](Self::shutdown).
    pub fn tick(&mut self, delta_time: f32, listener: Vec3) {
        if self.shut_down {
            return;
        }
        self.frame += 1;
        self.listener = listener;

        self.time_of_day
            .tick(delta_time, &mut self.backend, &mut self.writer);
        self.dispatch_time_of_day_events();

        let update = self.reverb.tick(
            delta_time,
            listener,
            self.tracer.as_ref(),
            &mut self.backend,
            &mut self.writer,
        );
        if (update.room_size - self.reported_room_size).abs() >= ROOM_SIZE_EVENT_STEP {
            self.emit(AmbiscapeEvent::RoomSizeChanged {
                old_size: self.reported_room_size,
                new_size: update.room_size,
            });
            self.reported_room_size = update.room_size;
        }

        let pass = self.occlusion.tick(
            delta_time,
            listener,
            self.tracer.as_ref(),
            &self.materials,
            &mut self.backend,
            &mut self.writer,
        );
        for emitter_id in pass.pruned {
            self.emit(AmbiscapeEvent::EmitterPruned { emitter_id });
        }

        self.ambience
            .tick(delta_time, &mut self.backend, &mut self.writer);
    }

    fn dispatch_time_of_day_events(&mut self) {
        while let Ok(event) = self.time_of_day_events.try_recv() {
            self.ambience.handle_event(&event);
            self.emit(event.into());
        }
    }

    fn emit(&self, mut event: AmbiscapeEvent) {
        loop {
            match self.event_sender.try_send(event) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    // Drop the oldest so the newest state is always observable.
                    let _ = self.event_receiver.try_recv();
                    event = rejected;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    /// Drains every event fired since the last call.
    pub fn poll_events(&self) -> Vec<AmbiscapeEvent> {
        self.event_receiver.try_iter().collect()
    }

    /// Registers an emitter for occlusion. The context keeps a weak reference.
    pub fn register_emitter<S: EmitterSource + 'static>(
        &mut self,
        source: &Arc<S>,
        effects: OcclusionEffects,
    ) -> Result<EmitterId> {
        let emitter_id = self.occlusion.register_emitter(source, effects)?;
        self.emit(AmbiscapeEvent::EmitterRegistered { emitter_id });
        Ok(emitter_id)
    }

    /// Registers an emitter with the configured default effects.
    pub fn register_emitter_default<S: EmitterSource + 'static>(
        &mut self,
        source: &Arc<S>,
    ) -> Result<EmitterId> {
        let effects = self.desc.occlusion.default_effects.clone();
        self.register_emitter(source, effects)
    }

    /// # Errors
    ///
    /// Returns [`AmbiscapeError::UnknownEmitter`] if `id` is not registered.
    pub fn unregister_emitter(&mut self, id: EmitterId) -> Result<()> {
        if !self.occlusion.unregister_emitter(id) {
            return Err(AmbiscapeError::UnknownEmitter(id.to_string()));
        }
        self.emit(AmbiscapeEvent::EmitterUnregistered { emitter_id: id });
        Ok(())
    }

    /// Forces the time-of-day phase.
    ///
    /// An immediate set also snaps the ambience tracks; a transitioned one
    /// crossfades them when it completes.
    pub fn force_phase(&mut self, phase: Phase, mode: ForceMode) {
        if self.shut_down {
            return;
        }
        if mode == ForceMode::Immediate {
            self.ambience.snap_to(phase);
        }
        self.time_of_day
            .force_phase(phase, mode, &mut self.backend, &mut self.writer);
        self.dispatch_time_of_day_events();
    }

    /// Stops ticking, forgets every emitter and reports
    /// [`AmbiscapeEvent::ContextShutdown`]. Calling it again does nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        let emitters = self.occlusion.emitter_count();
        self.occlusion.clear();
        self.emit(AmbiscapeEvent::ContextShutdown);
        log::info!(
            "Ambiscape context shut down after {} frames ({} emitters released)",
            self.frame,
            emitters
        );
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Smoothed occlusion of one emitter
    pub fn emitter_occlusion(&self, id: EmitterId) -> Option<f32> {
        self.occlusion.occlusion(id)
    }

    /// Normalized room size last written to the backend
    pub fn room_size(&self) -> f32 {
        self.reverb.room_size()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Listener position passed to the last tick
    pub fn listener(&self) -> Vec3 {
        self.listener
    }

    pub fn desc(&self) -> &AmbiscapeDesc {
        &self.desc
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// Material edits apply from the next occlusion recompute.
    pub fn materials_mut(&mut self) -> &mut MaterialTable {
        &mut self.materials
    }

    pub fn reverb(&self) -> &DynamicReverb {
        &self.reverb
    }

    pub fn occlusion(&self) -> &OcclusionEstimator {
        &self.occlusion
    }

    pub fn time_of_day(&self) -> &TimeOfDayController {
        &self.time_of_day
    }

    /// Clock control (`set_clock`, `set_paused`, `set_time_scale`).
    ///
    /// Use [`force_phase`](Self::force_phase) rather than the controller's
    /// own method so the ambience mixer follows.
    pub fn time_of_day_mut(&mut self) -> &mut TimeOfDayController {
        &mut self.time_of_day
    }

    pub fn ambience(&self) -> &AmbienceMixer {
        &self.ambience
    }
}
