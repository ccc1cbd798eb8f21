use crate::scene::{DemoScene, PARTITION};
use ambiscape::backend::MemoryBackend;
use ambiscape::occlusion::EmitterTransform;
use ambiscape::{
    AmbiscapeContext, AmbiscapeDesc, AmbiscapeEvent, EmitterId, MaterialTable, ResponseCurve,
    TimeOfDayDesc, Vec3,
};
use anyhow::Result;
use std::sync::Arc;

pub const TICK_RATE: u32 = 60;

const LISTENER_START: Vec3 = Vec3::new(0.0, 1.6, 0.0);
const WALK_SPEED: f32 = 2.0;

struct Emitter {
    label: &'static str,
    id: EmitterId,
    _transform: Arc<EmitterTransform>,
}

/// Runs a simulated session of `seconds` at [`TICK_RATE`] Hz.
///
/// The listener stands in the room for the first half, then walks out
/// through the open side. A full day passes every 24 seconds.
pub fn run_session(seconds: f32) -> Result<()> {
    let desc = AmbiscapeDesc::default().time_of_day(TimeOfDayDesc {
        day_duration_seconds: 24.0,
        start_clock: 0.7,
        transition_duration: 3.0,
        curve: ResponseCurve::SmoothStep,
        ..Default::default()
    });

    let mut materials = MaterialTable::with_presets();
    // The partition is a thin plywood sheet rather than solid wood.
    materials.add(ambiscape::MaterialAcousticProfile::new("Plywood", 0.45, 0.5))?;
    materials.set_override(PARTITION, "Plywood")?;

    let mut context =
        AmbiscapeContext::new(desc, Arc::new(DemoScene::new()), materials, MemoryBackend::new())?;

    let mut emitters = Vec::new();
    for (label, position) in [
        ("radio behind partition", Vec3::new(-5.0, 1.0, 0.0)),
        ("fountain in the courtyard", Vec3::new(3.0, 0.5, 15.0)),
    ] {
        let transform = Arc::new(EmitterTransform::new(position));
        let id = context.register_emitter_default(&transform)?;
        emitters.push(Emitter {
            label,
            id,
            _transform: transform,
        });
    }

    let dt = 1.0 / TICK_RATE as f32;
    let frames = (seconds * TICK_RATE as f32).round() as u32;
    let walk_from = frames / 2;

    log::info!(
        "Simulating {:.0}s at {} Hz, listener leaves the room after {:.0}s",
        seconds,
        TICK_RATE,
        seconds / 2.0
    );

    for frame in 0..frames {
        let walked = frame.saturating_sub(walk_from) as f32 * dt * WALK_SPEED;
        let listener = LISTENER_START + Vec3::X * walked;
        context.tick(dt, listener);

        for event in context.poll_events() {
            match event {
                AmbiscapeEvent::TimeOfDayChanged { .. } | AmbiscapeEvent::RoomSizeChanged { .. } => {}
                other => log::info!("Event: {:?}", other),
            }
        }

        if (frame + 1) % TICK_RATE == 0 {
            report(&context, &emitters, (frame + 1) / TICK_RATE);
        }
    }

    context.shutdown();
    for event in context.poll_events() {
        log::info!("Event: {:?}", event);
    }
    log::info!(
        "Session finished: {} backend writes, {} sweeps",
        context.backend().write_count(),
        context.reverb().sweeps_completed()
    );
    Ok(())
}

fn report(context: &AmbiscapeContext<MemoryBackend>, emitters: &[Emitter], second: u32) {
    let clock = context.time_of_day();
    let estimate = context.reverb().estimate();
    let ambience = context.ambience().gains();

    log::info!(
        "[{:>2}s] {} {:<5} time {:.2}{} | room {:.2} ({:.0} m3, RT60 {:.2}s) | ambience day {:.2} night {:.2} | listener x {:.1}",
        second,
        clock.clock_time_string(),
        clock.current_phase(),
        clock.parameter_value(),
        if clock.is_transitioning() {
            format!(" -> {} {:.0}%", clock.target_phase(), clock.transition_progress() * 100.0)
        } else {
            String::new()
        },
        context.room_size(),
        estimate.smoothed_volume,
        estimate.decay_time(),
        ambience.day,
        ambience.night,
        context.listener().x,
    );

    for emitter in emitters {
        let occlusion = context.emitter_occlusion(emitter.id).unwrap_or(0.0);
        log::debug!(
            "       {} occlusion {:.2} volume {:.2} cutoff {:.0} Hz",
            emitter.label,
            occlusion,
            context.backend().emitter_volume(emitter.id).unwrap_or(1.0),
            context
                .backend()
                .emitter_parameter(emitter.id, "LowpassCutoff")
                .unwrap_or(0.0),
        );
    }
}
