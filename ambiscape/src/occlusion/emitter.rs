//! Emitters as seen by the occlusion registry.

use crate::backend::AudioBackend;
use crate::config::OcclusionEffects;
use crate::math::{Vec3, lerp};
use crate::scene::ColliderId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Weak};

/// Lightweight, type-safe handle for a registered emitter.
///
/// Also identifies the emitter's playing instance in [`AudioBackend`] calls.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterId(pub u64);

impl std::fmt::Display for EmitterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmitterId({})", self.0)
    }
}

/// A sound emitter owned by the host.
///
/// The registry only keeps a weak reference, so dropping the host's `Arc`
/// is enough to take the emitter out of scope.
pub trait EmitterSource: Send + Sync {
    /// World-space position of the emitter
    fn position(&self) -> Vec3;

    /// Whether `collider` is the emitter's own body or one of its descendants
    fn owns_collider(&self, collider: ColliderId) -> bool;

    /// Inactive emitters hold their last occlusion and receive no writes.
    fn is_active(&self) -> bool {
        true
    }
}

/// Ready-made [`EmitterSource`] whose position the host updates each frame.
///
/// # Example
///
/// ```
/// use ambiscape::math::Vec3;
/// use ambiscape::occlusion::{EmitterSource, EmitterTransform};
/// use ambiscape::scene::ColliderId;
///
/// let radio = EmitterTransform::new(Vec3::new(4.0, 1.0, 0.0)).with_colliders([ColliderId(12)]);
/// radio.set_position(Vec3::new(5.0, 1.0, 0.0));
/// assert_eq!(radio.position(), Vec3::new(5.0, 1.0, 0.0));
/// assert!(radio.owns_collider(ColliderId(12)));
/// ```
#[derive(Debug)]
pub struct EmitterTransform {
    position: Mutex<Vec3>,
    colliders: Vec<ColliderId>,
    active: AtomicBool,
}

impl EmitterTransform {
    pub fn new(position: Vec3) -> Self {
        Self {
            position: Mutex::new(position),
            colliders: Vec::new(),
            active: AtomicBool::new(true),
        }
    }

    /// Colliders belonging to the emitter and its children, skipped by occlusion rays.
    pub fn with_colliders(mut self, colliders: impl IntoIterator<Item = ColliderId>) -> Self {
        self.colliders.extend(colliders);
        self
    }

    pub fn set_position(&self, position: Vec3) {
        match self.position.lock() {
            Ok(mut p) => *p = position,
            Err(poisoned) => *poisoned.into_inner() = position,
        }
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }
}

impl EmitterSource for EmitterTransform {
    fn position(&self) -> Vec3 {
        match self.position.lock() {
            Ok(p) => *p,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn owns_collider(&self, collider: ColliderId) -> bool {
        self.colliders.contains(&collider)
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}

/// Which of an emitter's effects its backend instance can receive.
///
/// Computed once, the first time the emitter is ticked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterCapabilities {
    pub occlusion_parameter: bool,
    pub volume: bool,
    pub lowpass_parameter: bool,
}

impl EmitterCapabilities {
    pub fn probe(backend: &dyn AudioBackend, emitter: EmitterId, effects: &OcclusionEffects) -> Self {
        let occlusion_parameter = effects
            .parameter_name
            .as_deref()
            .is_some_and(|name| backend.has_emitter_parameter(emitter, name));
        let lowpass_parameter =
            effects.lowpass_enabled && backend.has_emitter_parameter(emitter, &effects.lowpass_parameter);

        if let Some(name) = effects.parameter_name.as_deref() {
            if !occlusion_parameter {
                log::warn!("{} has no parameter '{}', skipping it", emitter, name);
            }
        }
        if effects.lowpass_enabled && !lowpass_parameter {
            log::warn!(
                "{} has no parameter '{}', low-pass disabled",
                emitter,
                effects.lowpass_parameter
            );
        }

        Self {
            occlusion_parameter,
            volume: effects.volume_enabled,
            lowpass_parameter,
        }
    }
}

/// Backend-facing values derived from one occlusion value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectValues {
    pub occlusion: f32,
    pub volume: f32,
    pub lowpass_cutoff: f32,
}

impl OcclusionEffects {
    /// Maps an occlusion value through the effect curve.
    pub fn evaluate(&self, occlusion: f32) -> EffectValues {
        let shaped = self.curve.evaluate(occlusion);
        EffectValues {
            occlusion,
            volume: lerp(1.0, self.min_volume_when_occluded, shaped),
            lowpass_cutoff: lerp(
                self.open_cutoff,
                self.closed_cutoff,
                shaped * self.max_lowpass_amount,
            ),
        }
    }
}

/// Registry entry for one emitter.
#[derive(Debug)]
pub struct EmitterRegistration {
    pub(crate) id: EmitterId,
    pub(crate) source: Weak<dyn EmitterSource>,
    pub(crate) effects: OcclusionEffects,
    pub(crate) capabilities: Option<EmitterCapabilities>,
    pub(crate) current_occlusion: f32,
    pub(crate) target_occlusion: f32,
}

impl EmitterRegistration {
    pub fn id(&self) -> EmitterId {
        self.id
    }

    /// Smoothed value applied to the backend
    pub fn current_occlusion(&self) -> f32 {
        self.current_occlusion
    }

    /// Value from the latest line-of-sight computation
    pub fn target_occlusion(&self) -> f32 {
        self.target_occlusion
    }

    pub fn effects(&self) -> &OcclusionEffects {
        &self.effects
    }

    pub fn capabilities(&self) -> Option<EmitterCapabilities> {
        self.capabilities
    }

    pub fn is_alive(&self) -> bool {
        self.source.strong_count() > 0
    }
}
