//! # Ambiscape
//!
//! An engine-agnostic spatial audio parameter engine. Ambiscape watches the
//! scene around a listener and keeps a handful of mixer parameters up to date:
//!
//! - a normalized **room size** estimated from raycast sweeps, for reverb
//! - a per-emitter **occlusion** value from line-of-sight material blocking,
//!   driving volume and low-pass cutoff
//! - a **time-of-day** value ramped across day/night boundaries, with day and
//!   night ambience beds crossfaded when the phase changes
//!
//! Ambiscape renders no audio. Geometry comes in through a [`RayTracer`] and
//! every computed value goes out through an [`AudioBackend`].
//!
//! ## Quick Start
//!
//! ```
//! use ambiscape::*;
//! use std::sync::Arc;
//!
//! struct OpenField;
//!
//! impl RayTracer for OpenField {
//!     fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: LayerMask) -> Option<RayHit> {
//!         None
//!     }
//! }
//!
//! let mut context = AmbiscapeContext::new(
//!     AmbiscapeDesc::default(),
//!     Arc::new(OpenField),
//!     MaterialTable::with_presets(),
//!     backend::MemoryBackend::new(),
//! )?;
//!
//! // The host owns the emitter; the context only holds a weak reference.
//! let radio = Arc::new(occlusion::EmitterTransform::new(Vec3::new(4.0, 0.0, 0.0)));
//! let radio_id = context.register_emitter_default(&radio)?;
//!
//! // Once per frame
//! context.tick(1.0 / 60.0, Vec3::ZERO);
//!
//! for event in context.poll_events() {
//!     if let AmbiscapeEvent::PhaseChanged { phase } = event {
//!         println!("Now {}", phase);
//!     }
//! }
//! assert_eq!(context.emitter_occlusion(radio_id), Some(0.0));
//!
//! context.shutdown();
//! # Ok::<(), AmbiscapeError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`AmbiscapeContext`]**: owns one instance of each service and ticks them in order
//! - **[`DynamicReverb`](reverb::DynamicReverb)**: batched sweeps and room-volume estimation
//! - **[`OcclusionEstimator`](occlusion::OcclusionEstimator)**: emitter registry and occlusion
//! - **[`TimeOfDayController`]**: day/night clock and transitions
//! - **[`AmbienceMixer`](ambience::AmbienceMixer)**: day/night ambience crossfades
//! - **[`MaterialTable`]**: acoustic profiles looked up by collider and material name
//! - **[`AmbiscapeEvent`]**: everything the context reports to the host
//!
//! ## Degraded mode
//!
//! Nothing in a frame can fail. Missing parameters are probed once and
//! skipped; unknown materials use the `Default` profile; rejected writes are
//! logged once and retried by the next frame. Audio then simply stops
//! reacting instead of going silent.

pub mod ambience;
pub mod backend;
pub mod config;
pub mod context;
pub mod crossfade;
pub mod curve;
pub mod error;
pub mod events;
pub mod math;
pub mod occlusion;
pub mod reverb;
pub mod scene;
pub mod time_of_day;

pub use backend::{AudioBackend, ParameterWriter};
pub use config::{AmbienceDesc, AmbiscapeDesc, OcclusionDesc, OcclusionEffects, ReverbDesc, TimeOfDayDesc};
pub use context::AmbiscapeContext;
pub use curve::ResponseCurve;
pub use error::{AmbiscapeError, Result};
pub use events::AmbiscapeEvent;
pub use math::Vec3;
pub use occlusion::{EmitterId, EmitterSource};
pub use scene::{ColliderId, LayerMask, MaterialAcousticProfile, MaterialTable, RayHit, RayTracer};
pub use time_of_day::{ForceMode, Phase, TimeOfDayController, TimeOfDayEvent};
