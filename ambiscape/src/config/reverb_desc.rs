use super::{ensure, ensure_positive};
use crate::curve::ResponseCurve;
use crate::error::Result;
use crate::scene::LayerMask;

/// Configuration for the raycast room-size reverb estimator
#[derive(Debug, Clone)]
pub struct ReverbDesc {
    /// Azimuth samples per elevation band
    pub horizontal_rays: usize,
    /// Number of elevation bands
    pub vertical_layers: usize,
    /// Total vertical field covered by the bands, in degrees (60 = ±30°)
    pub vertical_fov_degrees: f32,
    /// Length of every ray; misses count as hits at this distance
    pub max_distance: f32,
    /// Rays cast per tick, bounding per-frame cost
    pub rays_per_tick: usize,
    /// Full sweeps started per second
    pub update_frequency: f32,
    /// Origin movement that discards an in-progress sweep
    pub move_threshold: f32,
    pub min_room_volume: f32,
    pub max_room_volume: f32,
    /// Volume reported when a sweep yields fewer than three points
    pub default_volume: f32,
    /// Responsiveness of the smoothed volume, normalized by `update_frequency`
    pub smoothing_factor: f32,
    /// Maps the normalized volume into the backend's parameter domain
    pub response_curve: ResponseCurve,
    /// Global parameter receiving the normalized room size
    pub parameter_name: String,
    /// Optional global parameter receiving the estimated RT60 decay time
    pub decay_parameter_name: Option<String>,
    pub layer_mask: LayerMask,
}

impl Default for ReverbDesc {
    fn default() -> Self {
        Self {
            horizontal_rays: 16,
            vertical_layers: 3,
            vertical_fov_degrees: 60.0,
            max_distance: 50.0,
            rays_per_tick: 4,
            update_frequency: 2.0,
            move_threshold: 1.0,
            min_room_volume: 10.0,
            max_room_volume: 10_000.0,
            default_volume: 100.0,
            smoothing_factor: 2.0,
            response_curve: ResponseCurve::Linear,
            parameter_name: "RoomSize".to_string(),
            decay_parameter_name: None,
            layer_mask: LayerMask::ALL,
        }
    }
}

impl ReverbDesc {
    pub fn with_rays(mut self, horizontal_rays: usize, vertical_layers: usize) -> Self {
        self.horizontal_rays = horizontal_rays;
        self.vertical_layers = vertical_layers;
        self
    }

    pub fn with_rays_per_tick(mut self, rays_per_tick: usize) -> Self {
        self.rays_per_tick = rays_per_tick;
        self
    }

    pub fn with_volume_range(mut self, min: f32, max: f32, default: f32) -> Self {
        self.min_room_volume = min;
        self.max_room_volume = max;
        self.default_volume = default;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure(self.horizontal_rays > 0, || "horizontal_rays must be > 0".into())?;
        ensure(self.vertical_layers > 0, || "vertical_layers must be > 0".into())?;
        ensure(self.rays_per_tick > 0, || "rays_per_tick must be > 0".into())?;
        ensure(
            (0.0..180.0).contains(&self.vertical_fov_degrees),
            || "vertical_fov_degrees must be in [0, 180)".into(),
        )?;
        ensure_positive("max_distance", self.max_distance)?;
        ensure_positive("update_frequency", self.update_frequency)?;
        ensure_positive("min_room_volume", self.min_room_volume)?;
        ensure_positive("smoothing_factor", self.smoothing_factor)?;
        ensure(self.move_threshold >= 0.0, || "move_threshold must be >= 0".into())?;
        ensure(self.min_room_volume < self.max_room_volume, || {
            format!(
                "min_room_volume ({}) must be below max_room_volume ({})",
                self.min_room_volume, self.max_room_volume
            )
        })?;
        ensure(
            (self.min_room_volume..=self.max_room_volume).contains(&self.default_volume),
            || "default_volume must lie within the room volume range".into(),
        )?;
        ensure(!self.parameter_name.is_empty(), || {
            "parameter_name must not be empty".into()
        })
    }
}
