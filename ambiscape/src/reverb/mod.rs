//! Dynamic room-size reverb.
//!
//! Casts spherical sweeps around the listener a few rays per tick, turns each
//! completed sweep into a room volume, and keeps a normalized "room size"
//! parameter on the backend up to date.
//!
//! # Example
//!
//! ```
//! use ambiscape::backend::{MemoryBackend, ParameterWriter};
//! use ambiscape::config::ReverbDesc;
//! use ambiscape::math::Vec3;
//! use ambiscape::reverb::DynamicReverb;
//! use ambiscape::scene::{LayerMask, RayHit, RayTracer};
//!
//! struct OpenField;
//!
//! impl RayTracer for OpenField {
//!     fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: LayerMask) -> Option<RayHit> {
//!         None
//!     }
//! }
//!
//! let mut reverb = DynamicReverb::new(ReverbDesc::default());
//! let mut backend = MemoryBackend::new();
//! let mut writer = ParameterWriter::new();
//!
//! for _ in 0..60 {
//!     reverb.tick(1.0 / 60.0, Vec3::ZERO, &OpenField, &mut backend, &mut writer);
//! }
//! assert!(backend.parameter("RoomSize").is_some());
//! ```

mod room;
mod sampler;

pub use room::{MIN_SAMPLE_POINTS, RoomEstimate, RoomVolumeEstimator};
pub use sampler::{RayDescriptor, RaySample, RaycastSampler, sweep_directions};

use crate::backend::{AudioBackend, ParameterWriter};
use crate::config::ReverbDesc;
use crate::math::Vec3;
use crate::scene::RayTracer;

/// What one reverb tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbUpdate {
    /// A sweep finished this tick and replaced the raw volume
    pub sweep_completed: bool,
    /// Normalized room size written this tick
    pub room_size: f32,
}

/// Sweep scheduler, room estimator and parameter delivery.
#[derive(Debug, Clone)]
pub struct DynamicReverb {
    desc: ReverbDesc,
    sampler: RaycastSampler,
    estimator: RoomVolumeEstimator,
    since_sweep_start: f32,
    sweeps_completed: u64,
}

impl DynamicReverb {
    pub fn new(desc: ReverbDesc) -> Self {
        let sampler = RaycastSampler::new(desc.layer_mask);
        let estimator = RoomVolumeEstimator::new(&desc);
        // First sweep starts on the first tick.
        let since_sweep_start = 1.0 / desc.update_frequency;
        Self {
            desc,
            sampler,
            estimator,
            since_sweep_start,
            sweeps_completed: 0,
        }
    }

    /// Runs one tick of sweep work, smoothing and parameter delivery.
    ///
    /// Backend failures are logged through `writer`; the estimate keeps
    /// updating either way.
    pub fn tick(
        &mut self,
        delta_time: f32,
        origin: Vec3,
        tracer: &dyn RayTracer,
        backend: &mut dyn AudioBackend,
        writer: &mut ParameterWriter,
    ) -> ReverbUpdate {
        self.since_sweep_start += delta_time.max(0.0);

        if self.sampler.in_progress() && self.sampler.has_moved(origin, self.desc.move_threshold) {
            log::debug!(
                "Listener moved {:.2} during sweep, restarting from {:?}",
                self.sampler.origin().map_or(0.0, |o| o.distance(origin)),
                origin
            );
            self.start_sweep(origin);
        } else if !self.sampler.in_progress()
            && self.since_sweep_start >= 1.0 / self.desc.update_frequency
        {
            self.start_sweep(origin);
        }

        let mut sweep_completed = false;
        if self.sampler.in_progress() {
            self.sampler.sample_batch(tracer, self.desc.rays_per_tick);
            if self.sampler.is_complete() {
                let points = self.sampler.finish();
                let raw = self.estimator.observe(&points);
                self.sweeps_completed += 1;
                sweep_completed = true;
                log::debug!(
                    "Reverb sweep {} complete: {} points, raw volume {:.1}",
                    self.sweeps_completed,
                    points.len(),
                    raw
                );
            }
        }

        let estimate = self.estimator.relax(delta_time);
        let room_size = self.estimator.normalized();

        writer.write_global(backend, &self.desc.parameter_name, room_size);
        if let Some(name) = &self.desc.decay_parameter_name {
            writer.write_global(backend, name, estimate.decay_time());
        }

        ReverbUpdate {
            sweep_completed,
            room_size,
        }
    }

    fn start_sweep(&mut self, origin: Vec3) {
        self.sampler.generate(
            origin,
            self.desc.horizontal_rays,
            self.desc.vertical_layers,
            self.desc.vertical_fov_degrees,
            self.desc.max_distance,
        );
        self.since_sweep_start = 0.0;
    }

    pub fn estimate(&self) -> RoomEstimate {
        self.estimator.estimate()
    }

    /// Current normalized room size
    pub fn room_size(&self) -> f32 {
        self.estimator.normalized()
    }

    pub fn sweeps_completed(&self) -> u64 {
        self.sweeps_completed
    }

    pub fn sweep_in_progress(&self) -> bool {
        self.sampler.in_progress()
    }

    pub fn desc(&self) -> &ReverbDesc {
        &self.desc
    }
}
